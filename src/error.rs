use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the song-stem-splitter crate.
#[derive(Debug, Error)]
pub enum SplitterError {
    // Generic fallback (wraps anyhow)
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    // Domain-specific variants
    #[error("{what} not found: {}", .path.display())]
    NotFound { what: &'static str, path: PathBuf },

    #[error("No #MP3 or #AUDIO tag found in {}", .path.display())]
    MissingTagValue { path: PathBuf },

    #[error("Separation backend failed: {0}")]
    Backend(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Encoding error: {0}")]
    Encode(String),
}

// --- Implement From conversions for common errors ---
impl From<std::io::Error> for SplitterError {
    fn from(e: std::io::Error) -> Self {
        SplitterError::Anyhow(e.into())
    }
}

impl From<serde_json::Error> for SplitterError {
    fn from(e: serde_json::Error) -> Self {
        SplitterError::Anyhow(e.into())
    }
}

impl From<symphonia::core::errors::Error> for SplitterError {
    fn from(e: symphonia::core::errors::Error) -> Self {
        SplitterError::Audio(e.to_string())
    }
}

impl From<hound::Error> for SplitterError {
    fn from(e: hound::Error) -> Self {
        SplitterError::Audio(e.to_string())
    }
}

impl From<tempfile::PersistError> for SplitterError {
    fn from(e: tempfile::PersistError) -> Self {
        SplitterError::Anyhow(e.error.into())
    }
}

pub type Result<T> = std::result::Result<T, SplitterError>;
