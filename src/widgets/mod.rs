//! UI widgets.

pub mod cue_list;
pub mod timeline;
