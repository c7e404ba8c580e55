// Error types for protoscope

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum ProtoscopeError {
    // Lookup failures: explicit results, never used for control flow elsewhere
    #[snafu(display("Project {project_id} not found"))]
    ProjectNotFound { project_id: String },
    #[snafu(display("Screen {screen_id} not found in project {project_id}"))]
    ScreenNotFound {
        project_id: String,
        screen_id: String,
    },
    #[snafu(display("Hotspot {hotspot_id} not found on screen {screen_id}"))]
    HotspotNotFound {
        screen_id: String,
        hotspot_id: String,
    },
    #[snafu(display("Session {session_id} not found"))]
    SessionNotFound { session_id: String },

    // Authoring validation errors
    #[snafu(display("Invalid hotspot geometry: {reason}"))]
    InvalidHotspotGeometry { reason: String },

    // Player errors
    #[snafu(display("Project {project_id} has no screens to play"))]
    EmptyProject { project_id: String },

    // Storage errors
    #[snafu(display("Could not find application data directory"))]
    NoDataDir,
    #[snafu(display("Error reading or writing a persisted collection"))]
    StorageIOError { source: io::Error },
    #[snafu(display("Error serializing a persisted collection"))]
    StorageSerializeError { source: serde_json::Error },

    // Export errors
    #[snafu(display("Error serializing analytics export"))]
    ExportSerializeError { source: serde_json::Error },
    #[snafu(display("Error writing analytics export file: {path}"))]
    ExportIOError { path: String, source: io::Error },
}
