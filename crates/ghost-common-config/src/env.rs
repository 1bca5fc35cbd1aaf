//! Environment variable handling.

use std::env;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Environment variable names.
pub mod vars {
    pub const GHOST_CONFIG_PATH: &str = "GHOST_CONFIG_PATH";
    pub const GHOST_CHAIN_FILE: &str = "GHOST_CHAIN_FILE";
    pub const GHOST_DIFFICULTY: &str = "GHOST_DIFFICULTY";
}

/// Environment access.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Load `.env` then `.env.local` (later overrides earlier); missing files are fine.
    pub fn init() -> Self {
        let _ = dotenvy::from_filename(".env");
        let _ = dotenvy::from_filename(".env.local");
        Self { _guard: () }
    }

    /// Get an integer variable.
    pub fn get_int<T: std::str::FromStr>(var: &str) -> Result<Option<T>, EnvError> {
        match env::var(var) {
            Ok(v) => v.parse().map(Some).map_err(|_| EnvError::InvalidValue {
                var: var.to_string(),
                message: "expected integer".to_string(),
            }),
            Err(_) => Ok(None),
        }
    }
}
