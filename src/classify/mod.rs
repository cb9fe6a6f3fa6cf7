mod client;
mod types;

pub use client::{ClassifyClient, FALLBACK_ERROR};
pub use types::{ClassifyResponse, NoScanSelected, Prediction, PredictionUpdate, SelectedScan};
