//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostConfig {
    /// Ledger configuration.
    pub ledger: LedgerConfig,
    /// Directory monitor configuration.
    pub monitor: MonitorConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Ledger configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Leading zero hex digits required of every block digest.
    pub difficulty: u32,
    /// Pending changes that trigger an automatic commit.
    pub batch_size: usize,
    /// Upper bound on nonce attempts per block; unbounded when absent.
    pub max_seal_attempts: Option<u64>,
    /// Where the chain is persisted.
    pub chain_file: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: 2,
            batch_size: 10,
            max_seal_attempts: None,
            chain_file: PathBuf::from("logs/blockchain.json"),
        }
    }
}

/// Directory monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Substrings and `*.ext` globs for paths that are never recorded.
    pub ignore_patterns: Vec<String>,
    /// Watch subdirectories too.
    pub recursive: bool,
    /// How long `monitor` runs before committing and saving.
    pub duration_secs: u64,
    /// Capacity of the event channel between watcher and writer.
    pub channel_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: vec![
                "__pycache__".to_string(),
                ".git".to_string(),
                "*.pyc".to_string(),
                "blockchain.json".to_string(),
                "*.log".to_string(),
            ],
            recursive: false,
            duration_secs: 30,
            channel_capacity: 1024,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level (trace, debug, info, warn, error).
    pub level: String,
    /// Output format (pretty, compact, json).
    pub format: String,
    /// Optional log file.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}
