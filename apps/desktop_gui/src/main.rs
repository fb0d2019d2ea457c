mod backend_bridge;
mod controller;
mod media;
mod ui;

use anyhow::{anyhow, Result};
use clap::Parser;
use client_core::load_settings;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::FaceSearchApp;

#[derive(Parser, Debug)]
#[command(name = "face_search_gui")]
struct Args {
    /// Overrides `endpoint` from face_search.toml and FACE_SEARCH_ENDPOINT.
    #[arg(long)]
    endpoint: Option<String>,
    /// Request timeout in seconds; 0 waits indefinitely.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(endpoint) = args.endpoint {
        settings = settings.with_endpoint(endpoint);
    }
    if let Some(secs) = args.timeout_secs {
        settings = settings.with_timeout_secs(secs);
    }
    settings.validate()?;

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    let endpoint = settings.endpoint.clone();
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Face Search")
            .with_inner_size([1100.0, 800.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Face Search",
        options,
        Box::new(|_cc| Ok(Box::new(FaceSearchApp::new(cmd_tx, ui_rx, endpoint)))),
    )
    .map_err(|err| anyhow!("desktop GUI exited with error: {err}"))
}
