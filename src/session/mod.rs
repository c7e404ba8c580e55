// Recorded session model: one session per player run, with append-only click
// and screen-view event logs

pub(crate) mod recorder;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use recorder::SessionRecorder;

/// One continuous run of a user through a prototype, bounded by start/end.
///
/// Sessions are created when a player run begins, mutated only by append-only
/// writes during the run, and finalized by setting `ended_at`. A session with
/// `ended_at == None` is still in progress (or was abandoned).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// Weak reference to the project this run played through
    pub project_id: String,
    pub started_at: DateTime<Utc>,
    /// None while the run is in progress
    pub ended_at: Option<DateTime<Utc>>,
    /// Ordered click events, append-only
    pub clicks: Vec<ClickEvent>,
    /// Ordered screen-view events, append-only
    pub screen_views: Vec<ScreenViewEvent>,
}

impl Session {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            started_at: Utc::now(),
            ended_at: None,
            clicks: Vec::new(),
            screen_views: Vec::new(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Run duration in seconds, available once the session is finished
    pub fn duration_seconds(&self) -> Option<f64> {
        self.ended_at
            .map(|ended| (ended - self.started_at).num_milliseconds() as f64 / 1000.0)
    }
}

/// A single recorded click, hit or miss. Immutable once appended.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    /// Unique event identifier, the unit of append idempotency
    pub id: String,
    /// Screen the click landed on
    pub screen_id: String,
    /// Normalized horizontal position, 0-100 relative to the rendered image
    pub x: f32,
    /// Normalized vertical position, 0-100 relative to the rendered image
    pub y: f32,
    /// Whether the click landed inside a hotspot rectangle
    pub is_hotspot: bool,
    /// Matched hotspot, when the click was a hit
    pub hotspot_id: Option<String>,
    /// Resolved navigation target. None for misses, dead-end hotspots, and
    /// hotspots whose target no longer resolves to a screen.
    pub target_screen_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// One arrival at a screen. Recorded for the initial screen and for every
/// re-arrival via navigation, back, or restart. Immutable once appended.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScreenViewEvent {
    pub screen_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ScreenViewEvent {
    pub fn now(screen_id: impl Into<String>) -> Self {
        Self {
            screen_id: screen_id.into(),
            timestamp: Utc::now(),
        }
    }
}
