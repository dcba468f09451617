//! Cue move interaction: drag a cue's body to shift start and end together.
//!
//! Built on [`DragController`]: each cue bar owns one [`CueHandle`]. While
//! the gesture runs, every progress event reports the *incremental* pixel
//! delta since the previous event: pure visual feedback, never converted
//! to time and never written to the cue. At gesture end the *total* pixel
//! displacement from the anchor is converted to seconds with the zoom scale
//! as it is at that moment, and exactly one commit is produced.
//!
//! The track frame is re-queried on every event (the surface may scroll or
//! pan mid-gesture), which is why positions are resolved through a query
//! closure instead of a cached rect.

use eframe::egui::Id;
use log::debug;

use crate::entities::cue::CueTimingDelta;

use super::drag::{DragController, DragEvent, PointerInput};
use super::track::TrackFrame;
use super::zoom::Zoom;

/// What one pointer event amounted to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CueHandleAction {
    None,
    /// Incremental pixel delta since the previous progress event; the
    /// caller accumulates these into an uncommitted visual offset.
    Preview { delta_px: f32 },
    /// The single authoritative write for this gesture. Fires exactly once
    /// per gesture, including for zero-movement clicks (`delta == 0`).
    Commit {
        cue_index: usize,
        delta: CueTimingDelta,
    },
}

/// Move-whole-cue gesture state for one cue bar.
#[derive(Clone, Debug)]
pub struct CueHandle {
    cue_index: usize,
    controller: DragController,
    anchor_px: f32,
    last_px: f32,
}

impl CueHandle {
    pub fn new(cue_index: usize) -> Self {
        Self {
            cue_index,
            controller: DragController::new(),
            anchor_px: 0.0,
            last_px: 0.0,
        }
    }

    pub fn cue_index(&self) -> usize {
        self.cue_index
    }

    pub fn is_dragging(&self) -> bool {
        self.controller.is_active()
    }

    /// Bind to the cue bar's widget id. Re-binding or unbinding during a
    /// gesture still terminates it properly: the synthetic end runs the
    /// normal commit path, so no gesture is ever left dangling.
    pub fn attach<F>(&mut self, target: Option<Id>, frame_query: F, zoom: &Zoom) -> CueHandleAction
    where
        F: Fn() -> TrackFrame,
    {
        match self.controller.attach(target) {
            Some(event) => self.apply(event, frame_query, zoom),
            None => CueHandleAction::None,
        }
    }

    /// Feed one pointer input through the gesture state machine.
    pub fn on_pointer<F>(
        &mut self,
        input: PointerInput,
        frame_query: F,
        zoom: &Zoom,
    ) -> CueHandleAction
    where
        F: Fn() -> TrackFrame,
    {
        match self.controller.handle(input) {
            Some(event) => self.apply(event, frame_query, zoom),
            None => CueHandleAction::None,
        }
    }

    fn apply<F>(&mut self, event: DragEvent, frame_query: F, zoom: &Zoom) -> CueHandleAction
    where
        F: Fn() -> TrackFrame,
    {
        match event {
            DragEvent::Started { position } => {
                let rel = frame_query().relative_x(position);
                self.anchor_px = rel;
                self.last_px = rel;
                debug!("cue {}: drag anchored at {:.1}px", self.cue_index, rel);
                CueHandleAction::None
            }
            DragEvent::Moved { position } => {
                let rel = frame_query().relative_x(position);
                let delta_px = rel - self.last_px;
                self.last_px = rel;
                CueHandleAction::Preview { delta_px }
            }
            DragEvent::Ended { position } => {
                let rel = frame_query().relative_x(position);
                let total_px = rel - self.anchor_px;
                // Scale is read here, not at gesture start: a zoom change
                // mid-drag affects the conversion of the final total only.
                let delta_secs = zoom.px_to_secs(total_px);
                debug!(
                    "cue {}: commit {:+.1}px -> {:+.3}s",
                    self.cue_index, total_px, delta_secs
                );
                CueHandleAction::Commit {
                    cue_index: self.cue_index,
                    delta: CueTimingDelta::shift(delta_secs),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{Pos2, Vec2};
    use std::cell::Cell;

    fn fixed_frame(origin_x: f32) -> impl Fn() -> TrackFrame {
        move || TrackFrame::new(Pos2::new(origin_x, 0.0), Vec2::new(1000.0, 100.0))
    }

    fn handle_attached(cue_index: usize) -> CueHandle {
        let mut handle = CueHandle::new(cue_index);
        let action = handle.attach(Some(Id::new("cue-bar")), fixed_frame(0.0), &Zoom::new(100.0));
        assert_eq!(action, CueHandleAction::None);
        handle
    }

    fn down(x: f32) -> PointerInput {
        PointerInput::Down {
            position: Pos2::new(x, 10.0),
            over_target: true,
        }
    }

    fn mv(x: f32) -> PointerInput {
        PointerInput::Move {
            position: Pos2::new(x, 10.0),
        }
    }

    fn up(x: f32) -> PointerInput {
        PointerInput::Up {
            position: Pos2::new(x, 10.0),
        }
    }

    #[test]
    fn test_move_gesture_at_100px_per_sec() {
        // 100 px/s, origin at x=0: down at 50, move to 80, move to 60, up
        // at 60. Previews +30 and -20, commit 0.1s for the addressed cue.
        let zoom = Zoom::new(100.0);
        let mut handle = handle_attached(3);
        let frame = fixed_frame(0.0);

        assert_eq!(
            handle.on_pointer(down(50.0), &frame, &zoom),
            CueHandleAction::None
        );
        assert_eq!(
            handle.on_pointer(mv(80.0), &frame, &zoom),
            CueHandleAction::Preview { delta_px: 30.0 }
        );
        assert_eq!(
            handle.on_pointer(mv(60.0), &frame, &zoom),
            CueHandleAction::Preview { delta_px: -20.0 }
        );
        let commit = handle.on_pointer(up(60.0), &frame, &zoom);
        assert_eq!(
            commit,
            CueHandleAction::Commit {
                cue_index: 3,
                delta: CueTimingDelta::shift(0.1)
            }
        );
    }

    #[test]
    fn test_pixel_accounting_invariant() {
        // Sum of incremental previews equals pn - p0 exactly.
        let zoom = Zoom::new(100.0);
        let mut handle = handle_attached(0);
        let frame = fixed_frame(25.0);
        let positions = [40.0, 55.0, 30.0, 90.0, 72.0];

        handle.on_pointer(down(positions[0]), &frame, &zoom);
        let mut sum = 0.0f32;
        for &x in &positions[1..] {
            if let CueHandleAction::Preview { delta_px } = handle.on_pointer(mv(x), &frame, &zoom) {
                sum += delta_px;
            } else {
                panic!("expected preview");
            }
        }
        assert_eq!(sum, positions[positions.len() - 1] - positions[0]);
    }

    #[test]
    fn test_preview_is_scale_independent() {
        // Zoom changes mid-gesture must not touch pixel previews.
        let mut zoom = Zoom::new(100.0);
        let mut handle = handle_attached(0);
        let frame = fixed_frame(0.0);

        handle.on_pointer(down(10.0), &frame, &zoom);
        assert_eq!(
            handle.on_pointer(mv(40.0), &frame, &zoom),
            CueHandleAction::Preview { delta_px: 30.0 }
        );
        zoom.set_pixels_per_sec(400.0);
        assert_eq!(
            handle.on_pointer(mv(70.0), &frame, &zoom),
            CueHandleAction::Preview { delta_px: 30.0 }
        );
        // The commit uses the scale current at gesture end.
        assert_eq!(
            handle.on_pointer(up(70.0), &frame, &zoom),
            CueHandleAction::Commit {
                cue_index: 0,
                delta: CueTimingDelta::shift(60.0 / 400.0)
            }
        );
    }

    #[test]
    fn test_zero_movement_still_commits() {
        let zoom = Zoom::new(100.0);
        let mut handle = handle_attached(1);
        let frame = fixed_frame(0.0);

        handle.on_pointer(down(50.0), &frame, &zoom);
        assert_eq!(
            handle.on_pointer(up(50.0), &frame, &zoom),
            CueHandleAction::Commit {
                cue_index: 1,
                delta: CueTimingDelta::shift(0.0)
            }
        );
    }

    #[test]
    fn test_exactly_one_commit_per_gesture() {
        let zoom = Zoom::new(100.0);
        let mut handle = handle_attached(0);
        let frame = fixed_frame(0.0);
        let mut commits = 0;

        let inputs = [down(10.0), mv(20.0), mv(30.0), up(30.0), up(30.0), mv(40.0)];
        for input in inputs {
            if let CueHandleAction::Commit { .. } = handle.on_pointer(input, &frame, &zoom) {
                commits += 1;
            }
        }
        assert_eq!(commits, 1);
    }

    #[test]
    fn test_end_without_start_produces_nothing() {
        let zoom = Zoom::new(100.0);
        let mut handle = handle_attached(0);
        let frame = fixed_frame(0.0);
        assert_eq!(handle.on_pointer(up(50.0), &frame, &zoom), CueHandleAction::None);
        assert_eq!(handle.on_pointer(mv(50.0), &frame, &zoom), CueHandleAction::None);
    }

    #[test]
    fn test_scroll_mid_gesture_compensated() {
        // The frame origin shifts 30px between two events (surface
        // scrolled); relative positions absorb the shift, so the second
        // preview reports pointer motion plus the scroll.
        let zoom = Zoom::new(100.0);
        let mut handle = handle_attached(0);
        let origin = Cell::new(100.0f32);
        let frame = || TrackFrame::new(Pos2::new(origin.get(), 0.0), Vec2::new(1000.0, 100.0));

        handle.on_pointer(down(150.0), &frame, &zoom); // rel 50
        assert_eq!(
            handle.on_pointer(mv(160.0), &frame, &zoom),
            CueHandleAction::Preview { delta_px: 10.0 }
        );
        origin.set(70.0); // scrolled 30px left
        assert_eq!(
            handle.on_pointer(mv(160.0), &frame, &zoom),
            CueHandleAction::Preview { delta_px: 30.0 }
        );
        // Total: rel went 50 -> 90 with the final frame.
        assert_eq!(
            handle.on_pointer(up(160.0), &frame, &zoom),
            CueHandleAction::Commit {
                cue_index: 0,
                delta: CueTimingDelta::shift(0.4)
            }
        );
    }

    #[test]
    fn test_detach_mid_gesture_commits_at_last_position() {
        let zoom = Zoom::new(100.0);
        let mut handle = handle_attached(2);
        let frame = fixed_frame(0.0);

        handle.on_pointer(down(50.0), &frame, &zoom);
        handle.on_pointer(mv(90.0), &frame, &zoom);
        let action = handle.attach(None, &frame, &zoom);
        assert_eq!(
            action,
            CueHandleAction::Commit {
                cue_index: 2,
                delta: CueTimingDelta::shift(0.4)
            }
        );
        assert!(!handle.is_dragging());
    }

    #[test]
    fn test_independent_handles_do_not_interfere() {
        let zoom = Zoom::new(100.0);
        let frame = fixed_frame(0.0);
        let mut a = handle_attached(0);
        let mut b = handle_attached(1);

        a.on_pointer(down(10.0), &frame, &zoom);
        b.on_pointer(down(200.0), &frame, &zoom);
        a.on_pointer(mv(30.0), &frame, &zoom);
        assert_eq!(
            b.on_pointer(mv(210.0), &frame, &zoom),
            CueHandleAction::Preview { delta_px: 10.0 }
        );
        assert_eq!(
            a.on_pointer(up(30.0), &frame, &zoom),
            CueHandleAction::Commit {
                cue_index: 0,
                delta: CueTimingDelta::shift(0.2)
            }
        );
        // b's gesture is still running, unaffected by a's commit.
        assert!(b.is_dragging());
    }
}
