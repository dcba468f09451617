//! Application event handling - the main loop drains the bus once per
//! frame and applies events here. Widgets stay read-only over the
//! document; every mutation funnels through this pump, so a cue commit is
//! applied exactly once no matter which surface produced it.

use log::{debug, warn};

use crate::core::cue_events::*;
use crate::core::event_bus::{downcast_event, BoxedEvent};
use crate::entities::Document;
use crate::widgets::timeline::TimelineState;

/// Deferred outcomes a handler cannot perform itself (file dialogs are
/// opened by the shell, not inside the pump).
#[derive(Default)]
pub struct EventResult {
    pub open_dialog: bool,
    pub save_dialog: bool,
    pub status: Option<String>,
}

pub fn handle_app_event(
    event: &BoxedEvent,
    document: &mut Document,
    timeline: &mut TimelineState,
) -> EventResult {
    let mut result = EventResult::default();

    if let Some(e) = downcast_event::<CueTimingChangedEvent>(event) {
        match document.track.apply_timing_delta(e.cue_index, e.delta) {
            Ok(()) => {
                if e.delta.start_delta != 0.0 || e.delta.end_delta != 0.0 {
                    document.dirty = true;
                }
            }
            Err(err) => {
                warn!("cue timing commit rejected: {}", err);
                result.status = Some(format!("Timing change rejected: {}", err));
            }
        }
    } else if let Some(CueSelectedEvent(selection)) = downcast_event(event) {
        timeline.selected_cue = *selection;
    } else if let Some(ZoomChangedEvent(pps)) = downcast_event(event) {
        timeline.zoom.set_pixels_per_sec(*pps);
        debug!("zoom set to {} px/s", timeline.zoom.pixels_per_sec());
    } else if let Some(PanChangedEvent(pan)) = downcast_event(event) {
        timeline.pan_offset_secs = pan.max(0.0);
    } else if let Some(SetPlayheadEvent(time)) = downcast_event(event) {
        document.playhead = time.max(0.0);
    } else if let Some(OpenDocumentEvent(path)) = downcast_event(event) {
        match Document::load(path) {
            Ok(loaded) => {
                *document = loaded;
                timeline.selected_cue = None;
                timeline.pan_offset_secs = 0.0;
                result.status = Some(format!("Opened {}", document.title()));
            }
            Err(err) => {
                warn!("open failed: {:#}", err);
                result.status = Some(format!("Open failed: {:#}", err));
            }
        }
    } else if let Some(SaveDocumentEvent(path)) = downcast_event(event) {
        match document.save_as(path) {
            Ok(()) => result.status = Some(format!("Saved {}", document.title())),
            Err(err) => {
                warn!("save failed: {:#}", err);
                result.status = Some(format!("Save failed: {:#}", err));
            }
        }
    } else if downcast_event::<QuickSaveEvent>(event).is_some() {
        match document.path.clone() {
            Some(path) => match document.save_as(&path) {
                Ok(()) => result.status = Some(format!("Saved {}", document.title())),
                Err(err) => {
                    warn!("save failed: {:#}", err);
                    result.status = Some(format!("Save failed: {:#}", err));
                }
            },
            None => result.save_dialog = true,
        }
    } else if downcast_event::<OpenDocumentDialogEvent>(event).is_some() {
        result.open_dialog = true;
    } else if downcast_event::<SaveDocumentDialogEvent>(event).is_some() {
        result.save_dialog = true;
    } else {
        debug!("unhandled event: {}", (**event).type_name());
    }

    result
}
