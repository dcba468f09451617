use clap::Parser;
use eframe::egui;
use log::{debug, info};

use cueline::cli::Args;
use cueline::core::cue_events::{
    OpenDocumentEvent, QuickSaveEvent, SaveDocumentEvent, SetPlayheadEvent,
};
use cueline::core::event_bus::EventBus;
use cueline::entities::Document;
use cueline::main_events::{handle_app_event, EventResult};
use cueline::widgets::cue_list::render_cue_list;
use cueline::widgets::timeline::timeline_ui::{render_timeline, render_toolbar};
use cueline::widgets::timeline::{TimelineConfig, TimelineState};

const TIMELINE_STATE_KEY: &str = "timeline_state";

/// Main application state
struct CuelineApp {
    document: Document,
    timeline_state: TimelineState,
    timeline_config: TimelineConfig,
    event_bus: EventBus,
    status: Option<String>,
}

impl CuelineApp {
    fn new(cc: &eframe::CreationContext<'_>, args: Args) -> Self {
        let mut timeline_state: TimelineState = cc
            .storage
            .and_then(|storage| storage.get_string(TIMELINE_STATE_KEY))
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default();

        if let Some(zoom) = args.zoom {
            timeline_state.zoom.set_pixels_per_sec(zoom);
        }

        let mut document = Document::default();
        let mut status = None;
        if let Some(path) = args.file_path {
            match Document::load(&path) {
                Ok(loaded) => document = loaded,
                Err(err) => {
                    log::error!("could not open {}: {:#}", path.display(), err);
                    status = Some(format!("Open failed: {:#}", err));
                }
            }
        }
        if let Some(seek) = args.seek {
            document.playhead = seek.max(0.0);
        }

        Self {
            document,
            timeline_state,
            timeline_config: TimelineConfig::default(),
            event_bus: EventBus::new(),
            status,
        }
    }

    /// Drain the bus and apply queued events to the document and view.
    fn pump_events(&mut self) {
        let mut open_dialog = false;
        let mut save_dialog = false;

        for event in self.event_bus.poll() {
            let EventResult {
                open_dialog: open,
                save_dialog: save,
                status,
            } = handle_app_event(&event, &mut self.document, &mut self.timeline_state);
            open_dialog |= open;
            save_dialog |= save;
            if status.is_some() {
                self.status = status;
            }
        }

        if open_dialog {
            if let Some(path) = vtt_dialog("Open WebVTT file").pick_file() {
                self.event_bus.emit(OpenDocumentEvent(path));
            }
        }
        if save_dialog {
            if let Some(path) = vtt_dialog("Save WebVTT file").save_file() {
                self.event_bus.emit(SaveDocumentEvent(path));
            }
        }
    }

    fn render_file_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open…").clicked() {
                if let Some(path) = vtt_dialog("Open WebVTT file").pick_file() {
                    self.event_bus.emit(OpenDocumentEvent(path));
                }
            }
            if ui.button("Save").clicked() {
                self.event_bus.emit(QuickSaveEvent);
            }
            if ui.button("Save As…").clicked() {
                if let Some(path) = vtt_dialog("Save WebVTT file").save_file() {
                    self.event_bus.emit(SaveDocumentEvent(path));
                }
            }
            ui.separator();
            ui.label(self.document.title());
        });
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        // Arrow keys nudge the playhead; the active-cue preview follows.
        let step = ctx.input(|i| {
            if i.key_pressed(egui::Key::ArrowRight) {
                Some(0.5)
            } else if i.key_pressed(egui::Key::ArrowLeft) {
                Some(-0.5)
            } else {
                None
            }
        });
        if let Some(step) = step {
            self.event_bus
                .emit(SetPlayheadEvent(self.document.playhead + step));
        }
    }
}

impl eframe::App for CuelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump_events();
        self.handle_keyboard(ctx);

        let emitter = self.event_bus.emitter();

        egui::TopBottomPanel::top("file_bar").show(ctx, |ui| {
            self.render_file_bar(ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("{} cues", self.document.track.len()));
                ui.separator();
                ui.label(format!("playhead {:.2}s", self.document.playhead));
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status);
                }
            });
        });

        egui::TopBottomPanel::bottom("timeline")
            .resizable(false)
            .show(ctx, |ui| {
                render_toolbar(
                    ui,
                    self.document.track.duration(),
                    &mut self.timeline_state,
                    |evt| emitter.emit_boxed(evt),
                );
                render_timeline(
                    ui,
                    &self.document.track,
                    self.document.playhead,
                    &self.timeline_config,
                    &mut self.timeline_state,
                    |evt| emitter.emit_boxed(evt),
                );
            });

        egui::SidePanel::right("cue_list")
            .default_width(340.0)
            .show(ctx, |ui| {
                render_cue_list(
                    ui,
                    &self.document.track,
                    self.timeline_state.selected_cue,
                    self.document.active_cue(),
                    |evt| emitter.emit_boxed(evt),
                );
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            // Caption preview: the cue under the playhead. Video playback
            // itself is outside this tool.
            ui.centered_and_justified(|ui| {
                match self.document.active_cue().and_then(|i| self.document.track.get(i)) {
                    Some(cue) => {
                        ui.label(egui::RichText::new(&cue.text).size(24.0));
                    }
                    None => {
                        ui.label(egui::RichText::new("—").weak());
                    }
                }
            });
        });

        // Keep pumping while a gesture is running so commits land promptly.
        if self.timeline_state.dragging_cue().is_some() || self.event_bus.queue_len() > 0 {
            ctx.request_repaint();
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(json) = serde_json::to_string(&self.timeline_state) {
            debug!("persisting timeline state");
            storage.set_string(TIMELINE_STATE_KEY, json);
        }
    }
}

fn vtt_dialog(title: &str) -> rfd::FileDialog {
    rfd::FileDialog::new()
        .add_filter("WebVTT", &["vtt"])
        .set_title(title)
}

fn main() -> eframe::Result {
    let args = Args::parse();

    // Console logging; respects RUST_LOG when set.
    let default_level = match args.verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    info!("cueline starting...");
    debug!("Command-line args: {:?}", args);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("cueline v{}", env!("CARGO_PKG_VERSION")))
            .with_inner_size([1200.0, 560.0])
            .with_resizable(true),
        persist_window: true,
        ..Default::default()
    };

    eframe::run_native(
        "cueline",
        native_options,
        Box::new(move |cc| Ok(Box::new(CuelineApp::new(cc, args)))),
    )
}
