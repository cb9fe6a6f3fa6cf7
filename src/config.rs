use thiserror::Error;

/// Environment variable consulted when no CLI argument is given.
pub const BASE_URL_ENV: &str = "MRI_CLASSIFIER_URL";

/// Matches the port the bundled backend binds by default.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("classifier URL is empty")]
    EmptyBaseUrl,
    #[error("classifier URL must start with http:// or https://, got {0:?}")]
    InvalidScheme(String),
}

/// Where submissions go. Resolved once at startup and injected into the app,
/// so the view never reads the environment itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub base_url: String,
}

impl ClassifierConfig {
    /// A CLI argument wins over the environment variable; with neither set
    /// the local default applies.
    pub fn resolve(arg: Option<String>, env: Option<String>) -> Result<Self, ConfigError> {
        let raw = arg
            .or(env)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(raw)
    }

    /// Validate and normalize a base URL. A trailing slash is dropped so the
    /// endpoint path can always be appended verbatim.
    pub fn with_base_url(raw: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(ConfigError::InvalidScheme(trimmed.to_string()));
        }
        Ok(Self {
            base_url: trimmed.trim_end_matches('/').to_string(),
        })
    }
}
