mod app;
mod dialogs;

use app::CoverExtractorApp;
use cover_extractor_core::config::load_config;

fn main() -> Result<(), eframe::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = load_config();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(app::TITLE)
            .with_inner_size([800.0, 500.0])
            .with_min_inner_size([480.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        app::TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(CoverExtractorApp::new(cc, &config)))),
    )
}
