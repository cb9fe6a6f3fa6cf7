mod app;
mod classify;
mod config;
mod preview;
mod utils;

use app::ClassifierApp;
use config::{ClassifierConfig, BASE_URL_ENV};
use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match ClassifierConfig::resolve(
        std::env::args().nth(1),
        std::env::var(BASE_URL_ENV).ok(),
    ) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([560.0, 680.0])
            .with_min_inner_size([440.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Brain Tumor Classifier",
        options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Box::new(ClassifierApp::new(config))
        }),
    )
}
