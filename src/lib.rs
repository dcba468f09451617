//! cueline - caption cue retiming tool
//!
//! Re-exports all modules for use by binary targets.

pub mod cli;
pub mod core;
pub mod entities;
pub mod main_events;
pub mod widgets;

// Re-export commonly used types from core
pub use crate::core::event_bus::{downcast_event, BoxedEvent, EventBus, EventEmitter};

// Re-export entities
pub use entities::{Cue, CueTimingDelta, CueTrack, Document};
