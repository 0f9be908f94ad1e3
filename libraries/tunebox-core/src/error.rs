/// Core error types for Tunebox
use thiserror::Error;

/// Result type alias using `TuneboxError`
pub type Result<T> = std::result::Result<T, TuneboxError>;

/// Core error type shared by every store implementation
#[derive(Error, Debug)]
pub enum TuneboxError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// A uniqueness rule was violated (username, email, playlist membership)
    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

impl TuneboxError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a duplicate entry error
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }
}
