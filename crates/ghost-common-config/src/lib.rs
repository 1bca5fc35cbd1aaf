//! Configuration types for GHOST.
//!
//! This crate provides the configuration used by the ledger, the
//! directory monitor and the CLI, read from `.ghost/config.yaml`.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;
