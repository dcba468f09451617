//! Core modules - event bus and application events, independent of UI.

pub mod cue_events;
pub mod event_bus;

pub use event_bus::{downcast_event, BoxedEvent, Event, EventBus, EventEmitter};
