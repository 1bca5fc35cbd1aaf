//! Capture error types.

use ghost_ledger::LedgerError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from watching and ledger writing.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("invalid ignore pattern {pattern:?}: {message}")]
    Pattern { pattern: String, message: String },

    #[error("watch root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Result alias for capture operations.
pub type Result<T> = std::result::Result<T, CaptureError>;
