use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration for source '{source_key}': {reason}")]
    InvalidSourceConfig { source_key: String, reason: String },

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // Parsing errors
    #[error("Feed parsing failed: {0}")]
    FeedParse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Transform failed: {0}")]
    Transform(String),

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    pub fn invalid_source(source_key: &str, reason: impl Into<String>) -> Self {
        TrackerError::InvalidSourceConfig {
            source_key: source_key.to_string(),
            reason: reason.into(),
        }
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
