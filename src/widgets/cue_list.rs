//! Cue list panel: one row per cue with timing and text, the cue under
//! the playhead highlighted.

use eframe::egui::{self, Color32, RichText, Ui};

use crate::core::cue_events::{CueSelectedEvent, SetPlayheadEvent};
use crate::core::event_bus::BoxedEvent;
use crate::entities::vtt::format_timestamp;
use crate::entities::CueTrack;

pub fn render_cue_list(
    ui: &mut Ui,
    track: &CueTrack,
    selected: Option<usize>,
    active: Option<usize>,
    mut dispatch: impl FnMut(BoxedEvent),
) {
    if track.is_empty() {
        ui.label("No cues - open a .vtt file");
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt("cue_list_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (idx, cue) in track.iter().enumerate() {
                let timing = format!(
                    "{} → {}",
                    format_timestamp(cue.start),
                    format_timestamp(cue.end)
                );
                let mut label = RichText::new(format!("{}  {}", timing, cue.text.lines().next().unwrap_or(""))).monospace();
                if active == Some(idx) {
                    label = label.color(Color32::from_rgb(255, 220, 100));
                }

                let response = ui.selectable_label(selected == Some(idx), label);
                if response.clicked() {
                    dispatch(Box::new(CueSelectedEvent(Some(idx))));
                }
                if response.double_clicked() {
                    // Jump the playhead to the cue.
                    dispatch(Box::new(SetPlayheadEvent(cue.start)));
                }
            }
        });
}
