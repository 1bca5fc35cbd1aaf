//! CLI error handling.

use std::io;
use std::process::ExitCode;

use ghost_capture::CaptureError;
use ghost_common_config::ConfigError;
use ghost_ledger::LedgerError;
use thiserror::Error;

use crate::Exit;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<ConfigError>,
        hint: Option<String>,
    },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: io::Error,
    },

    /// The chain or a tracked file failed an integrity check.
    #[error("{message}")]
    Verification { message: String },

    #[error(transparent)]
    Ledger(LedgerError),

    #[error(transparent)]
    Capture(CaptureError),

    #[error("{0:#}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        let exit = match self {
            Self::Config { .. } => Exit::ConfigError,
            Self::Io { .. } => Exit::IoError,
            Self::Verification { .. } => Exit::VerificationFailed,
            Self::Ledger(e) | Self::Capture(CaptureError::Ledger(e)) => ledger_exit(e),
            Self::Capture(CaptureError::Pattern { .. }) => Exit::ConfigError,
            Self::Capture(CaptureError::NotADirectory(_)) => Exit::IoError,
            Self::Capture(_) | Self::Other(_) => Exit::GeneralError,
        };
        exit.into()
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config { hint, .. } => hint.as_deref(),
            Self::Ledger(e) if e.is_not_found() => Some("run `ghost monitor` or `ghost record` first"),
            _ => None,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
            hint: None,
        }
    }

    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    pub fn verification(message: impl Into<String>) -> Self {
        Self::Verification {
            message: message.into(),
        }
    }
}

fn ledger_exit(e: &LedgerError) -> Exit {
    match e {
        LedgerError::Compromised(_) => Exit::VerificationFailed,
        LedgerError::InvalidDifficulty(_) => Exit::ConfigError,
        LedgerError::FileRead { .. } | LedgerError::Storage(_) => Exit::IoError,
        _ => Exit::GeneralError,
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config {
            message: e.to_string(),
            hint: Some("check .ghost/config.yaml or run `ghost init`".to_string()),
            source: Some(e),
        }
    }
}

impl From<LedgerError> for CliError {
    fn from(e: LedgerError) -> Self {
        Self::Ledger(e)
    }
}

impl From<CaptureError> for CliError {
    fn from(e: CaptureError) -> Self {
        Self::Capture(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Other(anyhow::anyhow!("JSON serialization failed: {e}"))
    }
}
