//! Timeline rendering and pointer plumbing.
//!
//! The canvas draws a time ruler, one bar per cue and the playhead, and
//! feeds egui pointer state through each cue's [`CueHandle`]. The bar of a
//! cue mid-drag is drawn shifted by the accumulated preview offset; cue
//! data itself is only touched when the commit event lands in the main
//! loop. The track frame passed to the handles is rebuilt from the live
//! canvas rect and pan on every event, so scrolling or zooming mid-gesture
//! keeps relative positions honest.

use eframe::egui::{self, Align2, Color32, CursorIcon, FontId, Pos2, Rect, Sense, Ui, Vec2};

use crate::core::cue_events::{
    CueSelectedEvent, CueTimingChangedEvent, PanChangedEvent, SetPlayheadEvent, ZoomChangedEvent,
};
use crate::core::event_bus::BoxedEvent;
use crate::entities::CueTrack;

use super::cue_handle::CueHandleAction;
use super::drag::PointerInput;
use super::track::TrackFrame;
use super::zoom::{Zoom, DEFAULT_PIXELS_PER_SEC, MAX_PIXELS_PER_SEC, MIN_PIXELS_PER_SEC};
use super::{TimelineConfig, TimelineState};

const COLOR_RULER_BG: Color32 = Color32::from_gray(25);
const COLOR_TRACK_BG: Color32 = Color32::from_gray(32);
const COLOR_CUE: Color32 = Color32::from_rgb(70, 110, 170);
const COLOR_CUE_SELECTED: Color32 = Color32::from_rgb(100, 150, 220);
const COLOR_CUE_DRAGGED: Color32 = Color32::from_rgb(120, 170, 240);
const COLOR_PLAYHEAD: Color32 = Color32::from_rgb(255, 220, 100);

/// Zoom slider and view controls.
pub fn render_toolbar(
    ui: &mut Ui,
    track_duration: f64,
    state: &mut TimelineState,
    mut dispatch: impl FnMut(BoxedEvent),
) {
    ui.horizontal(|ui| {
        ui.label("Zoom:");
        let mut pps = state.zoom.pixels_per_sec();
        let response = ui.add_sized(
            Vec2::new(200.0, 20.0),
            egui::Slider::new(&mut pps, MIN_PIXELS_PER_SEC..=MAX_PIXELS_PER_SEC)
                .logarithmic(true)
                .suffix(" px/s"),
        );
        if response.changed() {
            state.zoom.set_pixels_per_sec(pps);
            dispatch(Box::new(ZoomChangedEvent(pps)));
        }

        if ui.button("Reset").on_hover_text("Default zoom").clicked() {
            state.zoom.set_pixels_per_sec(DEFAULT_PIXELS_PER_SEC);
            dispatch(Box::new(ZoomChangedEvent(DEFAULT_PIXELS_PER_SEC)));
        }

        if ui
            .button("Fit")
            .on_hover_text("Fit the whole track into view")
            .clicked()
            && track_duration > 0.0
            && state.last_canvas_width > 0.0
        {
            let pps = (state.last_canvas_width / track_duration as f32).max(MIN_PIXELS_PER_SEC);
            state.zoom.set_pixels_per_sec(pps);
            state.pan_offset_secs = 0.0;
            dispatch(Box::new(ZoomChangedEvent(state.zoom.pixels_per_sec())));
            dispatch(Box::new(PanChangedEvent(0.0)));
        }
    });
}

/// Render the ruler, cue track and playhead. Emits selection, playhead,
/// pan and cue-timing events through `dispatch`.
pub fn render_timeline(
    ui: &mut Ui,
    track: &CueTrack,
    playhead: f64,
    config: &TimelineConfig,
    state: &mut TimelineState,
    mut dispatch: impl FnMut(BoxedEvent),
) {
    state.sync_handles(track.len());
    state.last_canvas_width = ui.available_width();

    let width = ui.available_width();
    let zoom = state.zoom;
    let pan_px = zoom.secs_to_px(state.pan_offset_secs as f64);

    // Ruler row.
    let (ruler_rect, ruler_response) =
        ui.allocate_exact_size(Vec2::new(width, config.ruler_height), Sense::click_and_drag());
    if ui.is_rect_visible(ruler_rect) {
        draw_time_ruler(ui, ruler_rect, playhead, &zoom, pan_px);
    }
    if ruler_response.clicked() || ruler_response.dragged() {
        if let Some(pos) = ruler_response.interact_pointer_pos() {
            let frame = TrackFrame::from_canvas(ruler_rect, pan_px);
            let time = zoom.px_to_secs(frame.relative_x(pos)).max(0.0);
            dispatch(Box::new(SetPlayheadEvent(time)));
        }
    }

    // Cue track canvas.
    let (canvas_rect, canvas_response) =
        ui.allocate_exact_size(Vec2::new(width, config.track_height), Sense::hover());
    if ui.is_rect_visible(canvas_rect) {
        ui.painter().rect_filled(canvas_rect, 0.0, COLOR_TRACK_BG);
    }

    // The frame query hands each pointer event the surface geometry as it
    // is *now* - pan applied, never cached across events.
    let frame_query = move || TrackFrame::from_canvas(canvas_rect, pan_px);

    // Handles are taken out of the state so the plumbing below can borrow
    // freely.
    let mut handles = std::mem::take(&mut state.handles);
    let mut preview_px = state.preview_px;
    let dragging = handles.iter().position(|h| h.is_dragging());

    for (idx, cue) in track.iter().enumerate() {
        let Some(handle) = handles.get_mut(idx) else {
            break;
        };
        let is_dragged = dragging == Some(idx);
        let offset = if is_dragged { preview_px } else { 0.0 };

        let x0 = canvas_rect.min.x - pan_px + zoom.secs_to_px(cue.start) + offset;
        let x1 = canvas_rect.min.x - pan_px + zoom.secs_to_px(cue.end) + offset;
        let bar_rect = Rect::from_min_max(
            Pos2::new(x0, canvas_rect.min.y + config.bar_vpad),
            Pos2::new(x1, canvas_rect.max.y - config.bar_vpad),
        );

        let bar_id = ui.id().with(("cue_bar", idx));
        let mut action = handle.attach(Some(bar_id), frame_query, &zoom);
        apply_action(action, &mut preview_px, &mut dispatch);

        let response = ui
            .interact(bar_rect.intersect(canvas_rect), bar_id, Sense::click_and_drag())
            .on_hover_cursor(CursorIcon::Grab);

        if response.clicked() {
            // A click is a degenerate gesture: anchor and release coincide,
            // and the commit still fires (with a zero delta).
            if let Some(pos) = response.interact_pointer_pos() {
                action = handle.on_pointer(
                    PointerInput::Down {
                        position: pos,
                        over_target: true,
                    },
                    frame_query,
                    &zoom,
                );
                apply_action(action, &mut preview_px, &mut dispatch);
                action = handle.on_pointer(PointerInput::Up { position: pos }, frame_query, &zoom);
                apply_action(action, &mut preview_px, &mut dispatch);
            }
            dispatch(Box::new(CueSelectedEvent(Some(idx))));
        } else if let Some(input) = pointer_input_for(&response) {
            if matches!(input, PointerInput::Down { .. }) {
                dispatch(Box::new(CueSelectedEvent(Some(idx))));
            }
            action = handle.on_pointer(input, frame_query, &zoom);
            apply_action(action, &mut preview_px, &mut dispatch);
        }

        if ui.is_rect_visible(bar_rect) {
            draw_cue_bar(
                ui,
                bar_rect.intersect(canvas_rect),
                &cue.text,
                state.selected_cue == Some(idx),
                is_dragged,
                config,
            );
        }
    }

    state.handles = handles;
    state.preview_px = preview_px;

    // Playhead over the whole widget.
    let playhead_x = canvas_rect.min.x - pan_px + zoom.secs_to_px(playhead);
    if playhead_x >= canvas_rect.min.x && playhead_x <= canvas_rect.max.x {
        ui.painter().line_segment(
            [
                Pos2::new(playhead_x, ruler_rect.min.y),
                Pos2::new(playhead_x, canvas_rect.max.y),
            ],
            (2.0, COLOR_PLAYHEAD),
        );
    }

    // Wheel pans the track; the pan change shifts the track frame under
    // any in-flight gesture, which the fresh per-event queries absorb.
    if canvas_response.hovered() {
        let scroll = ui.input(|i| i.raw_scroll_delta);
        let delta_px = scroll.x + scroll.y;
        if delta_px != 0.0 {
            let max_pan = track.duration().max(0.0) as f32;
            let new_pan = (state.pan_offset_secs - zoom.px_to_secs(delta_px) as f32)
                .clamp(0.0, max_pan);
            if new_pan != state.pan_offset_secs {
                state.pan_offset_secs = new_pan;
                dispatch(Box::new(PanChangedEvent(new_pan)));
            }
        }
    }
}

/// Map one frame of egui response state onto a pointer input.
fn pointer_input_for(response: &egui::Response) -> Option<PointerInput> {
    if response.drag_started() {
        response
            .interact_pointer_pos()
            .map(|position| PointerInput::Down {
                position,
                over_target: true,
            })
    } else if response.dragged() {
        response
            .interact_pointer_pos()
            .map(|position| PointerInput::Move { position })
    } else if response.drag_stopped() {
        match response.interact_pointer_pos() {
            Some(position) => Some(PointerInput::Up { position }),
            // Release position lost (e.g. window focus loss) - treat as a
            // cancel; the controller ends at the last known position.
            None => Some(PointerInput::Cancel),
        }
    } else {
        None
    }
}

fn apply_action(
    action: CueHandleAction,
    preview_px: &mut f32,
    dispatch: &mut impl FnMut(BoxedEvent),
) {
    match action {
        CueHandleAction::None => {}
        CueHandleAction::Preview { delta_px } => *preview_px += delta_px,
        CueHandleAction::Commit { cue_index, delta } => {
            *preview_px = 0.0;
            dispatch(Box::new(CueTimingChangedEvent { cue_index, delta }));
        }
    }
}

fn draw_cue_bar(
    ui: &Ui,
    bar_rect: Rect,
    text: &str,
    selected: bool,
    dragged: bool,
    config: &TimelineConfig,
) {
    let painter = ui.painter();
    let color = if dragged {
        COLOR_CUE_DRAGGED
    } else if selected {
        COLOR_CUE_SELECTED
    } else {
        COLOR_CUE
    };
    painter.rect_filled(bar_rect, 3.0, color);
    painter.rect_stroke(
        bar_rect,
        3.0,
        egui::Stroke::new(1.0, Color32::from_gray(150)),
        egui::epaint::StrokeKind::Middle,
    );

    if bar_rect.width() > config.min_label_width {
        let label = text.lines().next().unwrap_or("");
        painter.text(
            Pos2::new(bar_rect.min.x + 6.0, bar_rect.center().y),
            Align2::LEFT_CENTER,
            label,
            FontId::proportional(11.0),
            Color32::from_gray(235),
        );
    }
}

fn draw_time_ruler(ui: &Ui, rect: Rect, playhead: f64, zoom: &Zoom, pan_px: f32) {
    let painter = ui.painter();
    painter.rect_filled(rect, 0.0, COLOR_RULER_BG);

    let step = tick_step_secs(zoom.pixels_per_sec());
    let visible_start = zoom.px_to_secs(pan_px).max(0.0);
    let visible_end = visible_start + zoom.px_to_secs(rect.width());

    let mut t = (visible_start / step).floor() * step;
    while t <= visible_end {
        let x = rect.min.x - pan_px + zoom.secs_to_px(t);
        if x >= rect.min.x && x <= rect.max.x {
            painter.line_segment(
                [Pos2::new(x, rect.max.y - 5.0), Pos2::new(x, rect.max.y)],
                (1.0, Color32::from_gray(100)),
            );
            painter.text(
                Pos2::new(x + 2.0, rect.min.y + 1.0),
                Align2::LEFT_TOP,
                format_tick(t),
                FontId::monospace(9.0),
                Color32::from_gray(150),
            );
        }
        t += step;
    }

    let playhead_x = rect.min.x - pan_px + zoom.secs_to_px(playhead);
    if playhead_x >= rect.min.x && playhead_x <= rect.max.x {
        painter.line_segment(
            [
                Pos2::new(playhead_x, rect.min.y),
                Pos2::new(playhead_x, rect.max.y),
            ],
            (2.0, COLOR_PLAYHEAD),
        );
    }
}

/// Tick spacing in seconds, adapted to zoom so labels stay readable.
fn tick_step_secs(pps: f32) -> f64 {
    const CANDIDATES: [f64; 9] = [0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0];
    const MIN_TICK_PX: f64 = 70.0;
    for step in CANDIDATES {
        if step * pps as f64 >= MIN_TICK_PX {
            return step;
        }
    }
    300.0
}

fn format_tick(secs: f64) -> String {
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let m = (secs / 60.0) as u64;
        let s = secs - (m as f64) * 60.0;
        format!("{}:{:04.1}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_step_grows_as_zoom_shrinks() {
        assert!(tick_step_secs(1000.0) < tick_step_secs(10.0));
        assert_eq!(tick_step_secs(1000.0), 0.1);
        assert_eq!(tick_step_secs(10.0), 10.0);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(2.5), "2.5s");
        assert_eq!(format_tick(90.0), "1:30.0");
    }
}
