use std::sync::mpsc::Receiver;

use crate::classify::{Prediction, PredictionUpdate, SelectedScan};
use crate::preview::{DataUri, PreviewUpdate};

/// Everything the view renders from: the three user-visible values plus the
/// generation counters that keep late background completions from clobbering
/// newer state.
#[derive(Default)]
pub struct ViewState {
    pub scan: Option<SelectedScan>,
    pub preview: Option<DataUri>,
    pub prediction: Option<Prediction>,
    /// Bumped on every pick; preview reads carrying an older value are stale.
    pub preview_generation: u64,
    /// Bumped on every submission; replies carrying an older value are stale.
    pub submit_generation: u64,
    pub loading_preview: bool,
    pub awaiting_prediction: bool,
    pub preview_receiver: Option<Receiver<PreviewUpdate>>,
    pub prediction_receiver: Option<Receiver<PredictionUpdate>>,
}

impl ViewState {
    /// Replace the selection and invalidate the old preview. The displayed
    /// prediction intentionally stays until the next submission finishes.
    pub fn select_scan(&mut self, scan: SelectedScan) -> u64 {
        self.preview_generation += 1;
        self.scan = Some(scan);
        self.preview = None;
        self.loading_preview = true;
        self.preview_generation
    }

    /// Open a new submission round, superseding any still in flight.
    pub fn begin_submission(&mut self) -> u64 {
        self.submit_generation += 1;
        self.awaiting_prediction = true;
        self.submit_generation
    }

    pub fn apply_preview(&mut self, update: PreviewUpdate) {
        if update.generation != self.preview_generation {
            log::debug!(
                "dropping preview for superseded selection {}",
                update.generation
            );
            return;
        }
        self.loading_preview = false;
        match update.result {
            Ok(uri) => {
                log::debug!(
                    "preview ready: {} ({} bytes, {} chars encoded)",
                    uri.mime(),
                    uri.byte_len(),
                    uri.as_str().len()
                );
                self.preview = Some(uri);
            }
            // A failed read leaves the preview slot empty; the log record is
            // the only trace.
            Err(e) => log::warn!("preview read failed: {e}"),
        }
    }

    pub fn apply_prediction(&mut self, update: PredictionUpdate) {
        if update.generation != self.submit_generation {
            log::debug!(
                "dropping reply for superseded submission {}",
                update.generation
            );
            return;
        }
        self.awaiting_prediction = false;
        log::info!(
            "prediction for round {}: {}",
            update.generation,
            update.prediction.text()
        );
        self.prediction = Some(update.prediction);
    }

    /// Back to the initial empty view. Bumping both generations orphans any
    /// work still in flight, and dropping the receivers lets those senders
    /// fail silently.
    pub fn clear(&mut self) {
        self.scan = None;
        self.preview = None;
        self.prediction = None;
        self.preview_generation += 1;
        self.submit_generation += 1;
        self.loading_preview = false;
        self.awaiting_prediction = false;
        self.preview_receiver = None;
        self.prediction_receiver = None;
    }

    pub fn is_busy(&self) -> bool {
        self.loading_preview || self.awaiting_prediction
    }
}
