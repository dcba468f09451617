//! Application events: cue edits, timeline view, document I/O.

use std::path::PathBuf;

use crate::entities::cue::CueTimingDelta;

// === Cue edits ===

/// The single commit issued at the end of a cue drag gesture.
#[derive(Clone, Debug)]
pub struct CueTimingChangedEvent {
    pub cue_index: usize,
    pub delta: CueTimingDelta,
}

#[derive(Clone, Debug)]
pub struct CueSelectedEvent(pub Option<usize>);

// === Timeline view ===

#[derive(Clone, Debug)]
pub struct ZoomChangedEvent(pub f32);

#[derive(Clone, Debug)]
pub struct PanChangedEvent(pub f32);

/// Move the playhead to an absolute time (seconds).
#[derive(Clone, Debug)]
pub struct SetPlayheadEvent(pub f64);

// === Document I/O ===

#[derive(Clone, Debug)]
pub struct OpenDocumentEvent(pub PathBuf);

#[derive(Clone, Debug)]
pub struct SaveDocumentEvent(pub PathBuf);

/// Save to the document's known path, or fall back to a dialog.
#[derive(Clone, Debug)]
pub struct QuickSaveEvent;

#[derive(Clone, Debug)]
pub struct OpenDocumentDialogEvent;

#[derive(Clone, Debug)]
pub struct SaveDocumentDialogEvent;
