use chrono::{Duration, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use protoscope::analytics::compute_stats;
use protoscope::session::{ClickEvent, ScreenViewEvent, Session};
use uuid::Uuid;

fn create_sample_session(session_no: usize, clicks_per_session: usize) -> Session {
    let mut session = Session::new("bench-project");
    session.ended_at = Some(session.started_at + Duration::seconds(45 + session_no as i64));

    for click_no in 0..clicks_per_session {
        let screen_id = format!("screen-{}", click_no % 5);
        session.clicks.push(ClickEvent {
            id: Uuid::new_v4().to_string(),
            screen_id: screen_id.clone(),
            x: (click_no % 100) as f32,
            y: (click_no % 100) as f32,
            is_hotspot: click_no % 3 != 0,
            hotspot_id: None,
            target_screen_id: None,
            timestamp: Utc::now(),
        });
        session.screen_views.push(ScreenViewEvent {
            screen_id,
            timestamp: Utc::now(),
        });
    }

    session
}

fn bench_stats_reduction(c: &mut Criterion) {
    let mut group = c.benchmark_group("analytics");

    let small: Vec<Session> = (0..10).map(|n| create_sample_session(n, 20)).collect();
    group.bench_function("compute_stats_10_sessions", |b| {
        b.iter(|| black_box(compute_stats(&small)));
    });

    let large: Vec<Session> = (0..500).map(|n| create_sample_session(n, 50)).collect();
    group.bench_function("compute_stats_500_sessions", |b| {
        b.iter(|| black_box(compute_stats(&large)));
    });

    group.finish();
}

criterion_group!(benches, bench_stats_reduction);
criterion_main!(benches);
