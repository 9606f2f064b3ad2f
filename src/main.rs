use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use eframe::egui;

use rusty_norm::app::RustyNormApp;
use rusty_norm::cli::Cli;
use rusty_norm::state::AppState;
use rusty_norm::ui::panels;

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let path = match cli.spectrum.clone() {
        Some(path) => path,
        None => panels::pick_spectrum().context("No spectrum selected")?,
    };

    let mut state = AppState::new(cli.session_config());
    state
        .open(&path)
        .with_context(|| format!("Cannot normalize {}", path.display()))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        &format!("Rusty Norm – {}", path.display()),
        options,
        Box::new(|_cc| Ok(Box::new(RustyNormApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
