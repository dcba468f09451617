//! Timeline widget - zoomable, pannable cue track with draggable cue bars.
//!
//! Data flow: egui input → [`drag::PointerInput`] → per-cue
//! [`cue_handle::CueHandle`] → preview offsets in [`TimelineState`] and
//! commit events dispatched to the application bus.

pub mod cue_handle;
pub mod drag;
pub mod timeline_ui;
pub mod track;
pub mod zoom;

use serde::{Deserialize, Serialize};

pub use cue_handle::{CueHandle, CueHandleAction};
pub use drag::{DragController, DragEvent, PointerInput};
pub use track::TrackFrame;
pub use zoom::Zoom;

/// Static layout knobs for the timeline widget.
#[derive(Clone, Debug)]
pub struct TimelineConfig {
    pub ruler_height: f32,
    pub track_height: f32,
    pub bar_vpad: f32,
    pub min_label_width: f32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            ruler_height: 20.0,
            track_height: 56.0,
            bar_vpad: 8.0,
            min_label_width: 40.0,
        }
    }
}

/// Timeline view state, persistent between frames.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineState {
    pub zoom: Zoom,
    /// Horizontal pan in seconds (time at the canvas left edge).
    pub pan_offset_secs: f32,
    pub selected_cue: Option<usize>,
    /// One gesture controller per cue bar, index-aligned with the track.
    #[serde(skip)]
    pub handles: Vec<CueHandle>,
    /// Uncommitted visual offset of the cue currently being dragged,
    /// accumulated from reported incremental pixel deltas only.
    #[serde(skip)]
    pub preview_px: f32,
    #[serde(skip)]
    pub last_canvas_width: f32,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self {
            zoom: Zoom::default(),
            pan_offset_secs: 0.0,
            selected_cue: None,
            handles: Vec::new(),
            preview_px: 0.0,
            last_canvas_width: 0.0,
        }
    }
}

impl TimelineState {
    /// Keep one handle per cue. Rebuilding on count change is fine: the
    /// cue count only changes on document load, never mid-gesture.
    pub fn sync_handles(&mut self, cue_count: usize) {
        if self.handles.len() != cue_count {
            self.handles = (0..cue_count).map(CueHandle::new).collect();
            self.preview_px = 0.0;
        }
    }

    /// Index of the cue currently being dragged, if any.
    pub fn dragging_cue(&self) -> Option<usize> {
        self.handles.iter().position(|h| h.is_dragging())
    }
}
