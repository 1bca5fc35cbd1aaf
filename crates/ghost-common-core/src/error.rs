//! Error types shared across GHOST crates.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for GHOST utility operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error with custom message.
    #[error("{0}")]
    Generic(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File system error tied to a specific path.
    #[error("{message}: {}", path.display())]
    FileSystem {
        message: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a new generic error.
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create a file system error for `path`.
    pub fn file_system(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: path.into(),
            source,
        }
    }

    /// Whether the underlying cause is a missing file.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Io(e) | Self::FileSystem { source: e, .. } => {
                e.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}

/// Result type alias using GHOST's Error.
pub type Result<T> = std::result::Result<T, Error>;
