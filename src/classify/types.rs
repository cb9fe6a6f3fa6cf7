use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::utils::mime;

/// The scan the user picked, plus the metadata shown next to the picker.
/// Replaced wholesale on every new pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedScan {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    pub mime_type: String,
}

impl SelectedScan {
    pub fn from_path(path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        let mime_type = mime::mime_for_path(&path).to_string();
        Self {
            path,
            file_name,
            size,
            mime_type,
        }
    }
}

/// Outcome of one classification round trip, as displayed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prediction {
    /// Label reported by the service.
    Label(String),
    /// Error reported by the service, or the generic fallback text.
    Failed(String),
}

impl Prediction {
    pub fn text(&self) -> &str {
        match self {
            Prediction::Label(label) => label,
            Prediction::Failed(reason) => reason,
        }
    }
}

/// Wire shape of the service's JSON reply. Both fields are optional; the
/// client decides how each combination maps to a prediction.
#[derive(Debug, Deserialize)]
pub struct ClassifyResponse {
    pub class: Option<String>,
    pub error: Option<String>,
}

/// A finished submission, tagged with the submission generation that started
/// it so superseded round trips can be discarded on arrival.
#[derive(Debug)]
pub struct PredictionUpdate {
    pub generation: u64,
    pub prediction: Prediction,
}

/// Submission refused before any I/O because nothing is selected.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no scan selected")]
pub struct NoScanSelected;
