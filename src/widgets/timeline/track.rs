//! Track frame: current geometry of the scrollable timeline surface.
//!
//! The frame is the *virtual* track origin (left edge of time zero) in the
//! same coordinate space as pointer events. Scrolling and panning move it
//! independently of zoom, so it must be re-queried from the live surface on
//! every pointer event: two moves of the same gesture can see different
//! origins and the relative positions still come out right.

use eframe::egui::{Pos2, Rect, Vec2};

/// Bounding geometry of the timeline surface at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackFrame {
    pub origin: Pos2,
    pub size: Vec2,
}

impl TrackFrame {
    pub fn new(origin: Pos2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Frame for a canvas rect whose content is panned `pan_px` to the left.
    /// The virtual origin sits left of the visible rect by the pan amount.
    pub fn from_canvas(rect: Rect, pan_px: f32) -> Self {
        Self {
            origin: Pos2::new(rect.min.x - pan_px, rect.min.y),
            size: rect.size(),
        }
    }

    /// Horizontal pointer offset from the track's current left edge.
    pub fn relative_x(&self, pointer: Pos2) -> f32 {
        pointer.x - self.origin.x
    }
}
