mod state;
mod ui;

use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;

use eframe::{egui, App};

use crate::classify::{
    ClassifyClient, NoScanSelected, Prediction, PredictionUpdate, SelectedScan, FALLBACK_ERROR,
};
use crate::config::ClassifierConfig;
use crate::preview::{self, PreviewUpdate};
pub use state::ViewState;

pub struct ClassifierApp {
    config: ClassifierConfig,
    client: ClassifyClient,
    state: ViewState,
}

impl ClassifierApp {
    pub fn new(config: ClassifierConfig) -> Self {
        log::info!("starting classifier UI against {}", config.base_url);
        let client = ClassifyClient::new(&config);
        Self {
            config,
            client,
            state: ViewState::default(),
        }
    }

    /// A new pick replaces the current scan and kicks off the preview read
    /// in the background. Dialog cancellation never reaches this point.
    pub fn select_scan(&mut self, path: PathBuf) {
        let scan = SelectedScan::from_path(path);
        log::info!(
            "selected {} ({} bytes, {})",
            scan.file_name,
            scan.size,
            scan.mime_type
        );
        let generation = self.state.select_scan(scan.clone());

        let (sender, receiver) = std_mpsc::channel();
        self.state.preview_receiver = Some(receiver);

        std::thread::spawn(move || match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(async {
                let result = preview::load_preview(&scan.path, &scan.mime_type).await;
                let _ = sender.send(PreviewUpdate { generation, result });
            }),
            Err(e) => {
                let _ = sender.send(PreviewUpdate {
                    generation,
                    result: Err(e),
                });
            }
        });
    }

    /// Refused before any I/O when nothing is selected; the caller surfaces
    /// that as a blocking alert. Otherwise the round trip runs in the
    /// background and the view stays interactive.
    pub fn start_classification(&mut self) -> Result<(), NoScanSelected> {
        let scan = self.state.scan.clone().ok_or(NoScanSelected)?;
        let generation = self.state.begin_submission();
        log::info!("submitting {} (round {})", scan.file_name, generation);

        let client = self.client.clone();
        let (sender, receiver) = std_mpsc::channel();
        self.state.prediction_receiver = Some(receiver);

        std::thread::spawn(move || {
            let prediction = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt.block_on(async { client.classify(&scan).await }),
                Err(e) => {
                    log::error!("could not start a runtime for the submission: {e}");
                    Prediction::Failed(FALLBACK_ERROR.to_string())
                }
            };
            let _ = sender.send(PredictionUpdate {
                generation,
                prediction,
            });
        });

        Ok(())
    }

    pub fn reset(&mut self) {
        log::info!("cleared the current scan and result");
        self.state.clear();
    }

    /// Drain finished background work into the view state. Each receiver is
    /// one-shot, so it is dropped as soon as its message has landed.
    pub fn update_state(&mut self, ctx: &egui::Context) {
        let mut had_updates = false;

        let preview_update = self
            .state
            .preview_receiver
            .as_ref()
            .and_then(|receiver| receiver.try_recv().ok());
        if let Some(update) = preview_update {
            self.state.preview_receiver = None;
            self.state.apply_preview(update);
            had_updates = true;
        }

        let prediction_update = self
            .state
            .prediction_receiver
            .as_ref()
            .and_then(|receiver| receiver.try_recv().ok());
        if let Some(update) = prediction_update {
            self.state.prediction_receiver = None;
            self.state.apply_prediction(update);
            had_updates = true;
        }

        if had_updates {
            ctx.request_repaint();
        }
        if self.state.is_busy() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

impl App for ClassifierApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
