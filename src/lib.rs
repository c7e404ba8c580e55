// Library interface for protoscope
// This allows integration tests to access internal modules

pub mod analytics;
pub mod errors;
pub mod player;
pub mod project;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use analytics::{AnalyticsExport, SessionStats, compute_stats, project_stats};
pub use errors::ProtoscopeError;
pub use player::{ClickResolution, PlayerEngine};
pub use project::{Hotspot, HotspotRect, HotspotUpdate, Project, PrototypeStore, Screen, ScreenUpdate};
pub use session::{ClickEvent, ScreenViewEvent, Session, SessionRecorder};
pub use storage::{FileBackedStorage, ProjectStorage, SessionStorage};
