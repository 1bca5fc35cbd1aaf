//! Configuration file loading and parsing.

use crate::types::GhostConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory holding the project configuration.
pub const CONFIG_DIR: &str = ".ghost";

/// Configuration file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.yaml";

/// Highest difficulty a SHA-256 hex digest can satisfy.
pub const MAX_DIFFICULTY: u32 = 64;

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the project configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load configuration from `.ghost/config.yaml`, or defaults if absent.
    pub fn load(&self) -> Result<GhostConfig, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Ok(GhostConfig::default());
        }

        self.load_file(&config_path)
    }

    /// Load configuration from an explicit file, which must exist.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<GhostConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let expanded = self.expand_env_vars(&contents)?;

        let config: GhostConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        self.validate(&config)?;
        Ok(config)
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").map_err(|e| {
            ConfigError::ParseError {
                line: None,
                message: e.to_string(),
            }
        })?;

        let mut result = content.to_string();
        for cap in re.captures_iter(content) {
            let full_match = &cap[0];
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match std::env::var(var_name) {
                Ok(v) => v,
                Err(_) => match default {
                    Some(d) => d.to_string(),
                    None => {
                        return Err(ConfigError::EnvVarNotFound {
                            var: var_name.to_string(),
                        })
                    }
                },
            };

            result = result.replace(full_match, &value);
        }

        Ok(result)
    }

    /// Validate configuration values.
    pub fn validate(&self, config: &GhostConfig) -> Result<(), ConfigError> {
        if config.ledger.difficulty > MAX_DIFFICULTY {
            return Err(ConfigError::ValidationError {
                message: format!("ledger.difficulty must be at most {MAX_DIFFICULTY}"),
            });
        }

        if config.ledger.batch_size == 0 {
            return Err(ConfigError::ValidationError {
                message: "ledger.batch_size must be greater than 0".to_string(),
            });
        }

        if config.ledger.max_seal_attempts == Some(0) {
            return Err(ConfigError::ValidationError {
                message: "ledger.max_seal_attempts must be greater than 0 when set".to_string(),
            });
        }

        if config.monitor.channel_capacity == 0 {
            return Err(ConfigError::ValidationError {
                message: "monitor.channel_capacity must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Save configuration to `.ghost/config.yaml`.
    pub fn save(&self, config: &GhostConfig) -> Result<PathBuf, ConfigError> {
        let config_dir = self.base_path.join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(&config_path, format!("# GHOST integrity ledger configuration\n{yaml}"))?;
        Ok(config_path)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}
