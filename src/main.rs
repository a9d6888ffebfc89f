//! Namesake -- find near-identical file and folder names and fold them into
//! one folder.
//!
//! Thin binary entry point. All logic lives in the `namesake-core`
//! and `namesake-gui` crates.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use namesake_core::config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialise structured logging; RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Namesake starting");

    let config = Config::load();
    let directory = std::env::args_os().nth(1).map(PathBuf::from);

    // Build application state *before* opening the window so the initial scan
    // is already under way when the first frame renders.
    let state = namesake_gui::NamesakeState::build(config, directory);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("Namesake")
            .with_inner_size([1024.0, 680.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Namesake",
        options,
        Box::new(|cc| {
            Ok(Box::new(namesake_gui::NamesakeApp::with_state(
                cc, state,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))?;

    Ok(())
}
