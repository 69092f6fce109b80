//! Error types for Newsdesk

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NewsError>;

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Quota exceeded: {current}/{limit} posts already published")]
    QuotaExceeded { current: usize, limit: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl NewsError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            NewsError::Validation(_) | NewsError::InvalidInput(_) => 3,
            NewsError::Authentication(_) => 2,
            NewsError::QuotaExceeded { .. } => 4,
            NewsError::Config(_) => 1,
            NewsError::Store(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP status {0}: {1}")]
    HttpStatus(u16, String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Local storage error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}
