//! Error types for the fallible edges of the crate.
//!
//! The history engines never fail; only the render queue, the session
//! store and config loading return errors.

use thiserror::Error;

/// Why a render request did not produce an output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// No processor installed yet; the task was never queued.
    #[error("editor not ready: no image processor installed")]
    NotReady,

    /// The queue was cleared before the task ran.
    #[error("queue cleared")]
    Cleared,

    /// The processor rejected, failed or panicked on this task.
    #[error("processing failed: {0}")]
    Failed(String),

    /// The completion channel closed without a result.
    #[error("render queue dropped the request")]
    Dropped,
}

/// Errors from the SQLite session store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not determine user data directory")]
    NoDataDir,
}

/// Errors from loading or saving the editor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
