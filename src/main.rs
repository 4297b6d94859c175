use anyhow::Context;
use drawing2ai::gui::SketchApp;
use drawing2ai::remote::{DescriptionClient, ImageFetcher, SynthesisClient};
use drawing2ai::session::GenerationSession;
use drawing2ai::settings::{Settings, SETTINGS_FILE};
use drawing2ai::logging;

use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)?;
    logging::init(settings.debug_logging, settings.log_file.as_ref().map(PathBuf::from));

    let describer = DescriptionClient::from_settings(&settings)
        .context("description client needs an OpenAI API key")?;
    let synthesizer = SynthesisClient::from_settings(&settings)
        .context("synthesis client needs a Replicate API token")?;
    let fetcher = ImageFetcher::new(settings.request_timeout())?;
    let session = GenerationSession::new(
        Arc::new(describer),
        Arc::new(synthesizer),
        settings.debounce(),
    );
    tracing::info!(debounce_ms = settings.debounce_ms, "starting Drawing-2-AI");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 720.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Drawing-2-AI",
        native_options,
        Box::new(move |cc| Box::new(SketchApp::new(&cc.egui_ctx, &settings, session, fetcher))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run the window: {e}"))
}
