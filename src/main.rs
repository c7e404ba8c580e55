use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use itertools::Itertools;

use protoscope::analytics::{self, AnalyticsExport};
use protoscope::errors::ProtoscopeError;
use protoscope::project::PrototypeStore;
use protoscope::session::SessionRecorder;
use protoscope::storage::FileBackedStorage;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Override the data directory holding the project and session collections
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all prototype projects
    Projects,
    /// Print usability metrics for a project
    Stats {
        #[arg(short, long)]
        project: String,
    },
    /// Write the analytics export document for a project
    Export {
        #[arg(short, long)]
        project: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete all recorded sessions for a project
    Clear {
        #[arg(short, long)]
        project: String,
    },
}

fn open_storage(data_dir: &Option<PathBuf>) -> Result<FileBackedStorage, ProtoscopeError> {
    match data_dir {
        Some(dir) => FileBackedStorage::new(dir.clone()),
        None => FileBackedStorage::new_default(),
    }
}

fn projects(data_dir: &Option<PathBuf>) -> Result<(), ProtoscopeError> {
    let store = PrototypeStore::new(open_storage(data_dir)?)?;

    if store.projects().is_empty() {
        println!("No projects recorded yet");
        return Ok(());
    }

    for project in store
        .projects()
        .iter()
        .sorted_by(|a, b| b.updated_at.cmp(&a.updated_at))
    {
        println!(
            "{}  {}  ({} screens, updated {})",
            project.id,
            project.name,
            project.screens.len(),
            project.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn stats(data_dir: &Option<PathBuf>, project_id: &str) -> Result<(), ProtoscopeError> {
    let store = PrototypeStore::new(open_storage(data_dir)?)?;
    let recorder = SessionRecorder::new(open_storage(data_dir)?)?;

    let project = store.get_project(project_id)?;
    let stats = analytics::project_stats(&recorder, project_id);

    println!("Project: {}", project.name);
    println!("Sessions: {}", stats.total_sessions);
    println!("Clicks: {}", stats.total_clicks);
    println!("Avg clicks/session: {:.1}", stats.avg_clicks_per_session);
    println!("Avg session duration: {:.1}s", stats.avg_session_duration);
    println!("Missed clicks: {}", stats.missed_clicks.len());

    for (screen_id, views) in &stats.screen_view_counts {
        let name = project
            .screen(screen_id)
            .map(|s| s.name.as_str())
            .unwrap_or(screen_id.as_str());
        let clicks = stats
            .click_heatmap
            .get(screen_id)
            .map(Vec::len)
            .unwrap_or(0);
        println!("  {name}: {views} views, {clicks} clicks");
    }
    Ok(())
}

fn export(
    data_dir: &Option<PathBuf>,
    project_id: &str,
    output: &Option<PathBuf>,
) -> Result<(), ProtoscopeError> {
    let store = PrototypeStore::new(open_storage(data_dir)?)?;
    let recorder = SessionRecorder::new(open_storage(data_dir)?)?;

    let project = store.get_project(project_id)?;
    let document = AnalyticsExport::new(project, recorder.project_sessions(project_id));

    let path = output.clone().unwrap_or_else(|| {
        PathBuf::from(format!(
            "analytics-{}-{}.json",
            project.name,
            document.exported_at.format("%Y-%m-%d")
        ))
    });

    fs::write(&path, document.to_json()?).map_err(|e| ProtoscopeError::ExportIOError {
        path: format!("{:?}", path),
        source: e,
    })?;

    println!(
        "Exported {} sessions to {:?}",
        document.sessions.len(),
        path
    );
    Ok(())
}

fn clear(data_dir: &Option<PathBuf>, project_id: &str) -> Result<(), ProtoscopeError> {
    let mut recorder = SessionRecorder::new(open_storage(data_dir)?)?;
    let removed = recorder.project_sessions(project_id).len();
    recorder.clear_sessions(project_id)?;
    println!("Cleared {removed} sessions for project {project_id}");
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    match &cli.command {
        Commands::Projects => {
            projects(&cli.data_dir).expect("Error while listing projects");
        }
        Commands::Stats { project } => {
            stats(&cli.data_dir, project).expect("Error while computing project stats");
        }
        Commands::Export { project, output } => {
            export(&cli.data_dir, project, output).expect("Error while exporting analytics");
        }
        Commands::Clear { project } => {
            clear(&cli.data_dir, project).expect("Error while clearing project sessions");
        }
    };
}
