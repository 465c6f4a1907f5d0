//! VerseCue Error Types
//!
//! Centralized error handling for the fallible edges of the library: index
//! artifacts and the verse corpus. Configuration and the CLI use `anyhow`.
//! The live detection path never surfaces these; it degrades to "no display
//! change".

use thiserror::Error;

/// Central error type for VerseCue
#[derive(Error, Debug)]
pub enum VerseError {
    #[error("Verse index unavailable: {0}")]
    Index(String),

    #[error("Verse corpus error: {0}")]
    Corpus(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

/// Result type alias for VerseCue operations
pub type VerseResult<T> = Result<T, VerseError>;

/// Helper to convert Mutex poison errors
impl<T> From<std::sync::PoisonError<T>> for VerseError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        VerseError::Lock(err.to_string())
    }
}
