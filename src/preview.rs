//! Local preview of the selected scan, independent of the classifier service.

use std::io;
use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// A scan encoded as a self-contained `data:<mime>;base64,<payload>` string.
/// The raw bytes are kept alongside the string so the renderer can hand them
/// to the image loader without decoding the URI again every frame.
#[derive(Debug, Clone)]
pub struct DataUri {
    mime: String,
    uri: String,
    bytes: Arc<[u8]>,
}

impl DataUri {
    /// Encode raw file bytes under the given MIME type.
    pub fn encode(mime: &str, bytes: Vec<u8>) -> Self {
        let uri = format!("data:{};base64,{}", mime, STANDARD.encode(&bytes));
        Self {
            mime: mime.to_string(),
            uri,
            bytes: Arc::from(bytes.into_boxed_slice()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Decoded payload, shared with the renderer's bytes loader.
    pub fn bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

/// Outcome of one preview read, tagged with the selection generation that
/// started it so late reads for a replaced scan can be discarded.
#[derive(Debug)]
pub struct PreviewUpdate {
    pub generation: u64,
    pub result: Result<DataUri, io::Error>,
}

/// Read the file in full and encode it for inline display.
pub async fn load_preview(path: &Path, mime: &str) -> io::Result<DataUri> {
    let bytes = tokio::fs::read(path).await?;
    Ok(DataUri::encode(mime, bytes))
}
