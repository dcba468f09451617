//! Drag gesture controller: one pointer gesture at a time per handle.
//!
//! Turns a raw pointer stream into a strict lifecycle: exactly one
//! [`DragEvent::Started`], any number of [`DragEvent::Moved`] in host
//! delivery order, exactly one [`DragEvent::Ended`], then back to idle.
//! Each interactive handle owns its own controller instance, so several
//! cues can be mid-gesture at once without sharing any state.
//!
//! Once a gesture is active the controller consumes moves and releases at
//! host scope: `Move`/`Up` are accepted even when the pointer has left the
//! handle's bounds. `Cancel` (host-level interruption) ends the gesture at
//! the last known position, identically to a release.
//!
//! The returned events are the callback triple of the interaction layer:
//! the owner must process every `Some(..)` result, including the synthetic
//! `Ended` produced by [`DragController::attach`]/[`DragController::detach`]
//! mid-gesture. That guarantee is what keeps downstream consumers from ever
//! observing an unterminated gesture.

use eframe::egui::{Id, Pos2};
use log::trace;

/// Raw pointer input, in the same coordinate space as the track surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    /// Primary button press. `over_target` tells whether the press landed
    /// on this controller's handle; presses elsewhere are ignored.
    Down { position: Pos2, over_target: bool },
    /// Pointer motion, delivered at host scope while a gesture is active.
    Move { position: Pos2 },
    /// Primary button release, anywhere.
    Up { position: Pos2 },
    /// Host interruption (window lost focus, touch cancel). Treated as a
    /// release at the last known position.
    Cancel,
}

/// Lifecycle event emitted by the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragEvent {
    Started { position: Pos2 },
    Moved { position: Pos2 },
    Ended { position: Pos2 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Idle,
    Active,
}

/// Pointer-drag state machine for a single interactive handle.
#[derive(Clone, Debug, Default)]
pub struct DragController {
    target: Option<Id>,
    phase: Phase,
    last_position: Pos2,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the controller to a handle, replacing any previous binding.
    ///
    /// `None` is not an error: during initial layout the handle may simply
    /// not exist yet, and the controller stays inert until one appears.
    /// If a gesture is active and the target changes or goes away, the
    /// returned synthetic `Ended` (at the last known position) must be
    /// processed by the owner before the old binding is considered gone.
    #[must_use = "a synthetic Ended must be delivered to the gesture owner"]
    pub fn attach(&mut self, target: Option<Id>) -> Option<DragEvent> {
        if self.target == target {
            return None;
        }
        let ended = self.interrupt();
        self.target = target;
        ended
    }

    /// Unbind from the current handle. Same termination guarantee as
    /// [`DragController::attach`] with `None`.
    #[must_use = "a synthetic Ended must be delivered to the gesture owner"]
    pub fn detach(&mut self) -> Option<DragEvent> {
        self.attach(None)
    }

    pub fn target(&self) -> Option<Id> {
        self.target
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Feed one pointer input; returns the lifecycle event it produced, if
    /// any. Inputs while detached are dropped. A second `Down` during an
    /// active gesture is ignored, as are `Move`/`Up`/`Cancel` while idle
    /// (an end with no preceding start produces nothing).
    pub fn handle(&mut self, input: PointerInput) -> Option<DragEvent> {
        if self.target.is_none() {
            return None;
        }
        match (self.phase, input) {
            (Phase::Idle, PointerInput::Down { position, over_target: true }) => {
                self.phase = Phase::Active;
                self.last_position = position;
                trace!("drag start at {:?}", position);
                Some(DragEvent::Started { position })
            }
            (Phase::Active, PointerInput::Move { position }) => {
                self.last_position = position;
                Some(DragEvent::Moved { position })
            }
            (Phase::Active, PointerInput::Up { position }) => {
                self.phase = Phase::Idle;
                self.last_position = position;
                trace!("drag end at {:?}", position);
                Some(DragEvent::Ended { position })
            }
            (Phase::Active, PointerInput::Cancel) => {
                self.phase = Phase::Idle;
                trace!("drag cancelled at {:?}", self.last_position);
                Some(DragEvent::Ended {
                    position: self.last_position,
                })
            }
            // Idle guard + single-gesture-at-a-time.
            _ => None,
        }
    }

    /// End the active gesture (if any) at the last known position.
    fn interrupt(&mut self) -> Option<DragEvent> {
        if self.phase == Phase::Active {
            self.phase = Phase::Idle;
            Some(DragEvent::Ended {
                position: self.last_position,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached() -> DragController {
        let mut ctl = DragController::new();
        assert!(ctl.attach(Some(Id::new("handle"))).is_none());
        ctl
    }

    fn down(x: f32) -> PointerInput {
        PointerInput::Down {
            position: Pos2::new(x, 0.0),
            over_target: true,
        }
    }

    fn mv(x: f32) -> PointerInput {
        PointerInput::Move {
            position: Pos2::new(x, 0.0),
        }
    }

    fn up(x: f32) -> PointerInput {
        PointerInput::Up {
            position: Pos2::new(x, 0.0),
        }
    }

    #[test]
    fn test_full_gesture_lifecycle() {
        let mut ctl = attached();
        assert_eq!(
            ctl.handle(down(10.0)),
            Some(DragEvent::Started {
                position: Pos2::new(10.0, 0.0)
            })
        );
        assert!(ctl.is_active());
        assert_eq!(
            ctl.handle(mv(20.0)),
            Some(DragEvent::Moved {
                position: Pos2::new(20.0, 0.0)
            })
        );
        assert_eq!(
            ctl.handle(up(25.0)),
            Some(DragEvent::Ended {
                position: Pos2::new(25.0, 0.0)
            })
        );
        assert!(!ctl.is_active());
    }

    #[test]
    fn test_idle_guard_drops_moves_and_ups() {
        let mut ctl = attached();
        assert_eq!(ctl.handle(mv(20.0)), None);
        assert_eq!(ctl.handle(up(20.0)), None);
        assert_eq!(ctl.handle(PointerInput::Cancel), None);
    }

    #[test]
    fn test_down_off_target_ignored() {
        let mut ctl = attached();
        let input = PointerInput::Down {
            position: Pos2::new(10.0, 0.0),
            over_target: false,
        };
        assert_eq!(ctl.handle(input), None);
        assert!(!ctl.is_active());
    }

    #[test]
    fn test_second_down_ignored_while_active() {
        let mut ctl = attached();
        ctl.handle(down(10.0));
        assert_eq!(ctl.handle(down(50.0)), None);
        // Gesture continues from the original press.
        assert_eq!(
            ctl.handle(up(30.0)),
            Some(DragEvent::Ended {
                position: Pos2::new(30.0, 0.0)
            })
        );
    }

    #[test]
    fn test_cancel_ends_at_last_known_position() {
        let mut ctl = attached();
        ctl.handle(down(10.0));
        ctl.handle(mv(42.0));
        assert_eq!(
            ctl.handle(PointerInput::Cancel),
            Some(DragEvent::Ended {
                position: Pos2::new(42.0, 0.0)
            })
        );
        assert!(!ctl.is_active());
    }

    #[test]
    fn test_detach_mid_gesture_emits_synthetic_end() {
        let mut ctl = attached();
        ctl.handle(down(10.0));
        ctl.handle(mv(60.0));
        assert_eq!(
            ctl.detach(),
            Some(DragEvent::Ended {
                position: Pos2::new(60.0, 0.0)
            })
        );
        // Detached: all input is dropped.
        assert_eq!(ctl.handle(down(10.0)), None);
    }

    #[test]
    fn test_retarget_mid_gesture_terminates_first() {
        let mut ctl = attached();
        ctl.handle(down(10.0));
        let ended = ctl.attach(Some(Id::new("other")));
        assert!(matches!(ended, Some(DragEvent::Ended { .. })));
        // New binding starts clean.
        assert!(!ctl.is_active());
        assert!(ctl.handle(down(5.0)).is_some());
    }

    #[test]
    fn test_detach_while_idle_is_silent() {
        let mut ctl = attached();
        assert!(ctl.detach().is_none());
        assert!(ctl.detach().is_none());
    }

    #[test]
    fn test_reattach_same_target_keeps_gesture() {
        let mut ctl = attached();
        ctl.handle(down(10.0));
        assert!(ctl.attach(Some(Id::new("handle"))).is_none());
        assert!(ctl.is_active());
    }

    #[test]
    fn test_unattached_controller_is_inert() {
        let mut ctl = DragController::new();
        assert_eq!(ctl.handle(down(10.0)), None);
    }
}
