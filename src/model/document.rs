use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::task::TaskRoot;

pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 2.0;
pub const ZOOM_STEP: f64 = 0.1;

/// Pan offset of the view
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewOffset {
    pub x: f64,
    pub y: f64,
}

/// The persisted, exported and imported unit: a whole tree plus view state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDocument {
    pub root: TaskRoot,
    #[serde(default)]
    pub view_offset: ViewOffset,
    #[serde(default = "default_zoom", deserialize_with = "deserialize_zoom")]
    pub zoom: f64,
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
}

fn default_zoom() -> f64 {
    1.0
}

/// Stored zoom brought back into range; a non-finite value resets to 1
fn deserialize_zoom<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let zoom = f64::deserialize(deserializer)?;
    Ok(if zoom.is_finite() {
        clamp_zoom(zoom)
    } else {
        default_zoom()
    })
}

impl TreeDocument {
    pub fn new(root: TaskRoot) -> Self {
        TreeDocument {
            root,
            view_offset: ViewOffset::default(),
            zoom: default_zoom(),
            saved_at: Utc::now(),
        }
    }

    /// Fresh document holding the initial single-task tree
    pub fn initial() -> Self {
        TreeDocument::new(TaskRoot::initial())
    }

    pub fn zoom_in(&mut self) {
        self.zoom = clamp_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = clamp_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.view_offset.x += dx;
        self.view_offset.y += dy;
    }

    /// Back to zoom 1 at the origin
    pub fn reset_view(&mut self) {
        self.zoom = default_zoom();
        self.view_offset = ViewOffset::default();
    }
}

pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}
