use eframe::egui;

use crate::session::SessionEvent;
use crate::state::AppState;
use crate::ui::{panels, plot};

/// Share of the central panel height given to the raw spectrum.
const SPECTRUM_SHARE: f32 = 0.6;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyNormApp {
    pub state: AppState,
}

impl RustyNormApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

fn key_events(ctx: &egui::Context) -> Vec<SessionEvent> {
    if ctx.wants_keyboard_input() {
        return Vec::new();
    }
    ctx.input(|i| {
        let mut keys = Vec::new();
        if i.key_pressed(egui::Key::R) {
            keys.push(SessionEvent::Key('r'));
        }
        if i.key_pressed(egui::Key::W) {
            keys.push(SessionEvent::Key('w'));
        }
        keys
    })
}

impl eframe::App for RustyNormApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: bindings and notices ----
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            panels::status_bar(ui, &mut self.state);
        });

        // ---- Central panel: spectrum above, normalized below ----
        let navigating = self.state.is_navigating();
        let pick_radius = self.state.config.pick_radius_px;
        let mut events = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let height = ui.available_height();
                let scene = &mut self.state.scene;
                let events = ui
                    .allocate_ui(egui::vec2(ui.available_width(), height * SPECTRUM_SHARE), |ui| {
                        plot::spectrum_plot(ui, scene, navigating, pick_radius)
                    })
                    .inner;
                ui.separator();
                plot::normalized_plot(ui, scene);
                events
            })
            .inner;

        events.extend(key_events(ctx));
        for event in events {
            self.state.dispatch(event);
        }
    }
}
