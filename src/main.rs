use anyhow::{anyhow, Result};
use clap::Parser;
use eframe::egui;
use tracing::info;

use photoswipe::app::PhotoSwipeApp;
use photoswipe::config::Args;

fn main() -> Result<()> {
    photoswipe::logging::init();
    let config = Args::parse().into_config()?;
    info!(
        root = %config.library.root.display(),
        filter = %config.initial_filter,
        dry_run = config.library.dry_run,
        "starting review session"
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("PhotoSwipe")
            .with_inner_size([900.0, 1000.0]),
        ..Default::default()
    };

    eframe::run_native(
        "PhotoSwipe",
        native_options,
        Box::new(move |_cc| Ok(Box::new(PhotoSwipeApp::new(config)))),
    )
    .map_err(|err| anyhow!("{err}"))?;

    Ok(())
}
