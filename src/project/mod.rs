// Prototype graph model: projects own screens, screens own hotspots

pub(crate) mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use store::PrototypeStore;

/// Minimum hotspot dimension, as a percentage of the image. Rectangles at or
/// below this size in either dimension are rejected at creation.
pub const MIN_HOTSPOT_DIMENSION_PCT: f32 = 2.0;

/// A prototype project: an ordered sequence of screens linked by hotspots.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project identifier
    pub id: String,
    /// Human-readable project name
    pub name: String,
    /// Ordered screens, exclusively owned by this project
    pub screens: Vec<Screen>,
    /// Timestamp when the project was created
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last structural mutation
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create an empty project with a fresh identifier
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            screens: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the mutation timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn screen(&self, screen_id: &str) -> Option<&Screen> {
        self.screens.iter().find(|s| s.id == screen_id)
    }

    pub fn screen_mut(&mut self, screen_id: &str) -> Option<&mut Screen> {
        self.screens.iter_mut().find(|s| s.id == screen_id)
    }

    /// Resolve a screen id to its index in the ordered sequence. Dangling ids
    /// (including ids from another project) resolve to `None`.
    pub fn screen_index(&self, screen_id: &str) -> Option<usize> {
        self.screens.iter().position(|s| s.id == screen_id)
    }
}

/// One static image in a project, with an ordered position and hotspots.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    /// Unique screen identifier
    pub id: String,
    /// Display name shown in the player chrome
    pub name: String,
    /// Opaque reference to the uploaded image resource
    pub image_id: String,
    /// Ordered hotspots, exclusively owned by this screen
    pub hotspots: Vec<Hotspot>,
    /// Order index, unique within the owning project
    pub order: usize,
}

impl Screen {
    pub fn new(name: impl Into<String>, image_id: impl Into<String>, order: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            image_id: image_id.into(),
            hotspots: Vec::new(),
            order,
        }
    }

    pub fn hotspot(&self, hotspot_id: &str) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.id == hotspot_id)
    }

    pub fn hotspot_mut(&mut self, hotspot_id: &str) -> Option<&mut Hotspot> {
        self.hotspots.iter_mut().find(|h| h.id == hotspot_id)
    }
}

/// Axis-aligned rectangle in percentage-of-image coordinates.
///
/// `x + width` and `y + height` may exceed 100: out-of-bounds rectangles are
/// stored as drawn and clipped at render time.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct HotspotRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl HotspotRect {
    /// Validate and build a rectangle. Origin must lie within the image and
    /// both dimensions must exceed the minimum size threshold.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Result<Self, String> {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return Err("rectangle coordinates must be finite numbers".to_string());
        }
        if !(0.0..=100.0).contains(&x) || !(0.0..=100.0).contains(&y) {
            return Err(format!("origin ({x}, {y}) must be within 0-100"));
        }
        if width <= MIN_HOTSPOT_DIMENSION_PCT || height <= MIN_HOTSPOT_DIMENSION_PCT {
            return Err(format!(
                "dimensions ({width} x {height}) must exceed {MIN_HOTSPOT_DIMENSION_PCT}% in both directions"
            ));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Inclusive containment check on all four edges
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// A rectangular clickable region on a screen, optionally linked to a target
/// screen by id.
///
/// The target link is a weak reference: it is resolved by lookup at click
/// time, and a dangling id (target screen deleted after linking) is a defined
/// "no navigation" outcome rather than a structural error.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// Unique hotspot identifier
    pub id: String,
    #[serde(flatten)]
    pub rect: HotspotRect,
    /// Weak reference to the navigation target, if any
    pub target_screen_id: Option<String>,
    /// Optional editor label
    pub label: Option<String>,
}

impl Hotspot {
    pub fn new(rect: HotspotRect, target_screen_id: Option<String>, label: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            rect,
            target_screen_id,
            label,
        }
    }
}

/// Copy-on-write update for a screen. `None` fields are left unchanged;
/// identifier, hotspot ownership, and order never change through updates.
#[derive(Clone, Debug, Default)]
pub struct ScreenUpdate {
    pub name: Option<String>,
    pub image_id: Option<String>,
}

/// Copy-on-write update for a hotspot. Outer `None` leaves a field unchanged;
/// `Some(None)` clears an optional field.
#[derive(Clone, Debug, Default)]
pub struct HotspotUpdate {
    pub rect: Option<HotspotRect>,
    pub target_screen_id: Option<Option<String>>,
    pub label: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_creation() {
        let project = Project::new("Checkout flow");

        assert_eq!(project.name, "Checkout flow");
        assert!(project.screens.is_empty());
        assert!(!project.id.is_empty());
        assert_eq!(project.created_at, project.updated_at);
    }

    #[test]
    fn test_rect_validation() {
        assert!(HotspotRect::new(10.0, 10.0, 20.0, 20.0).is_ok());

        // Origin outside the image
        assert!(HotspotRect::new(-1.0, 10.0, 20.0, 20.0).is_err());
        assert!(HotspotRect::new(10.0, 101.0, 20.0, 20.0).is_err());

        // Negative or sub-minimum dimensions
        assert!(HotspotRect::new(10.0, 10.0, -5.0, 20.0).is_err());
        assert!(HotspotRect::new(10.0, 10.0, 20.0, 2.0).is_err());
        assert!(HotspotRect::new(10.0, 10.0, 1.9, 20.0).is_err());

        // Non-finite input
        assert!(HotspotRect::new(f32::NAN, 10.0, 20.0, 20.0).is_err());
    }

    #[test]
    fn test_rect_overflowing_image_is_tolerated() {
        // x + width > 100 is stored as drawn, clipped only at render time
        let rect = HotspotRect::new(90.0, 90.0, 30.0, 30.0).unwrap();
        assert!(rect.contains(100.0, 100.0));
    }

    #[test]
    fn test_rect_containment_is_edge_inclusive() {
        let rect = HotspotRect::new(10.0, 10.0, 20.0, 20.0).unwrap();

        assert!(rect.contains(10.0, 10.0));
        assert!(rect.contains(30.0, 30.0));
        assert!(rect.contains(10.0, 30.0));
        assert!(rect.contains(15.0, 15.0));

        assert!(!rect.contains(9.99, 15.0));
        assert!(!rect.contains(30.01, 15.0));
        assert!(!rect.contains(15.0, 9.99));
        assert!(!rect.contains(15.0, 30.01));
    }

    #[test]
    fn test_screen_index_resolution() {
        let mut project = Project::new("test");
        project.screens.push(Screen::new("A", "img-a", 0));
        project.screens.push(Screen::new("B", "img-b", 1));

        let screen_b_id = project.screens[1].id.clone();
        assert_eq!(project.screen_index(&screen_b_id), Some(1));
        assert_eq!(project.screen_index("no-such-screen"), None);
    }

    #[test]
    fn test_hotspot_serde_flattens_rect() {
        let hotspot = Hotspot::new(
            HotspotRect::new(10.0, 10.0, 20.0, 20.0).unwrap(),
            None,
            Some("Hotspot 1".to_string()),
        );

        let json = serde_json::to_value(&hotspot).unwrap();
        assert_eq!(json["x"], 10.0);
        assert_eq!(json["width"], 20.0);
        assert_eq!(json["label"], "Hotspot 1");

        let parsed: Hotspot = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, hotspot);
    }
}
