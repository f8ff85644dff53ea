mod app;
mod export_worker;

use eframe::egui;
use paneview_common::config::AppConfig;
use paneview_common::logging::init_logging;

use crate::app::ViewerApp;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load();
    init_logging(&config.logging);
    tracing::info!(base_dir = %config.initial_base_dir.display(), "Starting Paneview");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Paneview")
            .with_inner_size([1400.0, 900.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Paneview",
        options,
        Box::new(move |_cc| Box::new(ViewerApp::new(config))),
    )
    .map_err(|e| anyhow::anyhow!("viewer launch failed: {e}"))
}
