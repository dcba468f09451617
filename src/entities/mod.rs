//! Entities - cue data model and document I/O, no GUI dependencies.

pub mod cue;
pub mod document;
pub mod vtt;

pub use cue::{Cue, CueTimingDelta, CueTrack};
pub use document::Document;
