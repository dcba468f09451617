//! Zoom: the single pixels-per-second scale of the timeline.
//!
//! All pixel↔time conversions go through [`Zoom`]. The scale may change at
//! any moment (slider, wheel), including while a cue is being dragged, so
//! consumers must re-read it at the point of each conversion instead of
//! snapshotting it at gesture start.

use serde::{Deserialize, Serialize};

pub const MIN_PIXELS_PER_SEC: f32 = 10.0;
pub const MAX_PIXELS_PER_SEC: f32 = 1000.0;
pub const DEFAULT_PIXELS_PER_SEC: f32 = 100.0;

/// Conversion factor between on-screen pixels and seconds.
///
/// Always strictly positive: setters clamp into
/// [`MIN_PIXELS_PER_SEC`]..=[`MAX_PIXELS_PER_SEC`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zoom {
    pixels_per_sec: f32,
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            pixels_per_sec: DEFAULT_PIXELS_PER_SEC,
        }
    }
}

impl Zoom {
    pub fn new(pixels_per_sec: f32) -> Self {
        let mut zoom = Self::default();
        zoom.set_pixels_per_sec(pixels_per_sec);
        zoom
    }

    pub fn pixels_per_sec(&self) -> f32 {
        self.pixels_per_sec
    }

    /// Change the scale. Safe to call mid-gesture: subsequent conversions
    /// pick up the new scale, already-reported pixel deltas are untouched.
    pub fn set_pixels_per_sec(&mut self, pixels_per_sec: f32) {
        self.pixels_per_sec = pixels_per_sec.clamp(MIN_PIXELS_PER_SEC, MAX_PIXELS_PER_SEC);
    }

    pub fn px_to_secs(&self, px: f32) -> f64 {
        px as f64 / self.pixels_per_sec as f64
    }

    pub fn secs_to_px(&self, secs: f64) -> f32 {
        (secs * self.pixels_per_sec as f64) as f32
    }
}
