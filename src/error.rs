//! Error types for the summary-memory chat service

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for chat operations
pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Error, Debug)]
pub enum ChatError {

    // =============================
    // Conversation Errors
    // =============================

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Failed to write summary to {}: {source}", path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid session key: {0}")]
    InvalidSessionKey(String),

    #[error("Question must not be empty")]
    EmptyQuestion,

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl ChatError {
    /// True for failures of the external model call
    pub fn is_generation(&self) -> bool {
        matches!(self, ChatError::Generation(_))
    }

    /// True for failures caused by what the caller sent
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ChatError::InvalidSessionKey(_) | ChatError::EmptyQuestion
        )
    }
}
