// Analytics aggregation: reduces a project's recorded sessions into summary
// statistics, raw heatmap points, and the missed-click set
//
// The reduction is a pure function recomputed on demand over a point-in-time
// read of the session log. Orderings are stated and stable (session creation
// order, then chronological event order; screen keys sorted) so results are
// reproducible.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ProtoscopeError;
use crate::project::Project;
use crate::session::{ClickEvent, Session, SessionRecorder};
use crate::storage::SessionStorage;

/// One raw click coordinate for density rendering, tagged hit/miss
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapPoint {
    pub x: f32,
    pub y: f32,
    pub is_hotspot: bool,
}

/// Aggregate usability metrics for one project's sessions
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_sessions: usize,
    pub total_clicks: usize,
    pub avg_clicks_per_session: f64,
    /// Mean duration in seconds over finished sessions only; sessions still
    /// in progress are excluded, not counted as zero
    pub avg_session_duration: f64,
    /// Raw click points per screen, in session-then-chronological order; not
    /// pre-binned
    pub click_heatmap: BTreeMap<String, Vec<HeatmapPoint>>,
    pub screen_view_counts: BTreeMap<String, usize>,
    /// Every recorded click that landed outside all hotspots
    pub missed_clicks: Vec<ClickEvent>,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            total_sessions: 0,
            total_clicks: 0,
            avg_clicks_per_session: 0.0,
            avg_session_duration: 0.0,
            click_heatmap: BTreeMap::new(),
            screen_view_counts: BTreeMap::new(),
            missed_clicks: Vec::new(),
        }
    }
}

/// Reduce a project's sessions into aggregate stats. Pure and side-effect
/// free; safe to call while a player run is still appending events.
pub fn compute_stats(sessions: &[Session]) -> SessionStats {
    if sessions.is_empty() {
        return SessionStats::default();
    }

    let total_clicks: usize = sessions.iter().map(|s| s.clicks.len()).sum();

    let finished_durations: Vec<f64> = sessions
        .iter()
        .filter_map(Session::duration_seconds)
        .collect();
    let avg_session_duration = if finished_durations.is_empty() {
        0.0
    } else {
        finished_durations.iter().sum::<f64>() / finished_durations.len() as f64
    };

    let mut click_heatmap: BTreeMap<String, Vec<HeatmapPoint>> = BTreeMap::new();
    let mut screen_view_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut missed_clicks = Vec::new();

    for session in sessions {
        for click in &session.clicks {
            click_heatmap
                .entry(click.screen_id.clone())
                .or_default()
                .push(HeatmapPoint {
                    x: click.x,
                    y: click.y,
                    is_hotspot: click.is_hotspot,
                });
            if !click.is_hotspot {
                missed_clicks.push(click.clone());
            }
        }
        for view in &session.screen_views {
            *screen_view_counts.entry(view.screen_id.clone()).or_insert(0) += 1;
        }
    }

    SessionStats {
        total_sessions: sessions.len(),
        total_clicks,
        avg_clicks_per_session: total_clicks as f64 / sessions.len() as f64,
        avg_session_duration,
        click_heatmap,
        screen_view_counts,
        missed_clicks,
    }
}

/// Convenience over the recorder: aggregate everything recorded for one
/// project
pub fn project_stats<S: SessionStorage>(
    recorder: &SessionRecorder<S>,
    project_id: &str,
) -> SessionStats {
    compute_stats(&recorder.project_sessions(project_id))
}

/// Exportable analytics document: summary stats plus the raw sessions they
/// were computed from, for offline download and later re-aggregation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsExport {
    /// Project display name
    pub project: String,
    pub exported_at: DateTime<Utc>,
    pub stats: SessionStats,
    pub sessions: Vec<Session>,
}

impl AnalyticsExport {
    pub fn new(project: &Project, sessions: Vec<Session>) -> Self {
        Self {
            project: project.name.clone(),
            exported_at: Utc::now(),
            stats: compute_stats(&sessions),
            sessions,
        }
    }

    pub fn to_json(&self) -> Result<String, ProtoscopeError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ProtoscopeError::ExportSerializeError { source: e })
    }

    pub fn from_json(content: &str) -> Result<Self, ProtoscopeError> {
        serde_json::from_str(content)
            .map_err(|e| ProtoscopeError::ExportSerializeError { source: e })
    }
}
