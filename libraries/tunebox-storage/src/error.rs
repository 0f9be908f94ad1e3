/// Storage-specific errors
use thiserror::Error;
use tunebox_core::TuneboxError;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Query execution error
    #[error("Query error: {0}")]
    Query(String),

    /// A unique constraint rejected the write
    #[error("{0}")]
    Duplicate(String),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Turn a unique-constraint violation into `Duplicate`, leaving other
    /// database errors untouched
    pub fn unique_as_duplicate(err: sqlx::Error, message: impl Into<String>) -> Self {
        match err.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => Self::Duplicate(message.into()),
            _ => Self::Database(err),
        }
    }
}

impl From<StorageError> for TuneboxError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Duplicate(msg) => TuneboxError::Duplicate(msg),
            other => TuneboxError::storage(other.to_string()),
        }
    }
}

/// Decode a millisecond timestamp column
pub(crate) fn timestamp(millis: i64) -> Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StorageError::Query(format!("Invalid timestamp: {millis}")))
}
