//! Ledger error types.

use crate::chain::ChainFault;
use crate::sealer::SealError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by ledger operations.
///
/// Verification findings are not errors: `Chain::verify` returns them as
/// data. `Compromised` only appears when a caller asks for eager
/// verification on load.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A file's content could not be hashed.
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The block list is empty. Unreachable for correctly built chains.
    #[error("chain has no blocks")]
    EmptyChain,

    /// The persisted chain is malformed.
    #[error("malformed chain file: {0}")]
    Codec(String),

    /// Proof-of-work search failed.
    #[error(transparent)]
    Seal(#[from] SealError),

    /// A change violates the record invariants.
    #[error("invalid change for {path}: {reason}")]
    InvalidChange { path: String, reason: String },

    /// Difficulty cannot be satisfied by a hex SHA-256 digest.
    #[error("difficulty {0} exceeds the maximum of {max}", max = crate::block::MAX_DIFFICULTY)]
    InvalidDifficulty(u32),

    /// A sealed block does not extend the current tip.
    #[error("block {got} does not extend a chain of {expected} blocks")]
    OutOfOrder { expected: u64, got: u64 },

    /// Eager verification on load failed.
    #[error("chain failed verification: {0}")]
    Compromised(ChainFault),

    /// Reading or writing the chain file failed.
    #[error(transparent)]
    Storage(#[from] ghost_common_core::Error),
}

impl LedgerError {
    /// Build a `FileRead` error for `path`.
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means a file does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::FileRead { source, .. } => source.kind() == io::ErrorKind::NotFound,
            Self::Storage(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Whether retrying the same operation can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Seal(e) if e.is_retryable())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Codec(e.to_string())
    }
}

/// Result alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
