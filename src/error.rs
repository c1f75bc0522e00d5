//! Error types for Shiksha Setu

use thiserror::Error;

/// Errors that can occur in the core engine
#[derive(Debug, Error)]
pub enum SetuError {
    #[error("Invalid landmark set: {0}")]
    InvalidLandmarkSet(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Remote service unavailable: {0}")]
    RemoteServiceUnavailable(String),

    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),
}
