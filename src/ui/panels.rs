use eframe::egui::{self, Color32, RichText, Ui};

use crate::session::NoticeLevel;
use crate::state::{AppState, NavigationMode};

const BINDINGS: &str =
    "left click: add point   right click: remove point   middle click: fit   scroll: pan   r: reset   w: write";

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .selectable_label(state.navigation == NavigationMode::Select, "Select")
            .on_hover_text("Clicks pick continuum points")
            .clicked()
        {
            state.navigation = NavigationMode::Select;
        }
        if ui
            .selectable_label(state.navigation == NavigationMode::PanZoom, "Pan / Zoom")
            .on_hover_text("Drag to pan, ctrl + scroll to zoom, right drag to box zoom")
            .clicked()
        {
            state.navigation = NavigationMode::PanZoom;
        }

        ui.separator();

        if let Some(session) = &state.session {
            ui.label(format!(
                "{}  |  {} samples, {} points  |  {:?}",
                session.source().display(),
                session.spectrum().len(),
                session.control_points().len(),
                session.state()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Bottom bar – last notice and key bindings
// ---------------------------------------------------------------------------

pub fn status_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.weak(BINDINGS);
        let Some(notice) = state.scene.notice() else {
            return;
        };
        ui.separator();
        let color = match notice.level {
            NoticeLevel::Info => ui.visuals().text_color(),
            NoticeLevel::Warning => Color32::from_rgb(230, 160, 0),
            NoticeLevel::Error => Color32::RED,
        };
        ui.label(RichText::new(&notice.message).color(color));
        if ui.small_button("✕").clicked() {
            state.scene.dismiss_notice();
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn pick_spectrum() -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open spectrum")
        .add_filter(
            "Supported files",
            &["fits", "fit", "fts", "hdf5", "h5", "txt", "dat", "nspec"],
        )
        .add_filter("FITS", &["fits", "fit", "fts"])
        .add_filter("HDF5", &["hdf5", "h5"])
        .add_filter("Text", &["txt", "dat", "nspec"])
        .pick_file()
}

pub fn open_file_dialog(state: &mut AppState) {
    let Some(path) = pick_spectrum() else {
        return;
    };
    if let Err(e) = state.open(&path) {
        log::error!("Failed to load file: {e:#}");
        state.status_message = Some(format!("Error: {e:#}"));
    }
}
