//! Error types shared across KineSync crates.

use std::path::PathBuf;

/// Top-level error type for KineSync configuration and I/O.
#[derive(Debug, thiserror::Error)]
pub enum KinesyncError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using KinesyncError.
pub type KinesyncResult<T> = Result<T, KinesyncError>;

impl KinesyncError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
