//! Init command implementation.

use clap::Parser;
use ghost_common_config::{ConfigLoader, GhostConfig};
use tracing::info;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, StatusOutput};

/// Write a default configuration for the current directory
#[derive(Debug, Parser)]
pub struct InitCommand {
    /// Overwrite an existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Proof-of-work difficulty to configure
    #[arg(long, value_name = "ZEROS")]
    pub difficulty: Option<u32>,
}

impl InitCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let project_dir = std::env::current_dir()
            .map_err(|e| CliError::io("cannot determine current directory", e))?;
        let loader = ConfigLoader::new(&project_dir);

        let existing = loader.config_path();
        if existing.exists() && !self.force {
            return Err(CliError::Config {
                message: format!("{} already exists", existing.display()),
                source: None,
                hint: Some("pass --force to overwrite it".to_string()),
            });
        }

        let mut config = GhostConfig::default();
        if let Some(difficulty) = self.difficulty {
            config.ledger.difficulty = difficulty;
        }
        loader.validate(&config)?;

        let path = loader.save(&config)?;
        info!(path = %path.display(), "configuration written");
        print_output(
            ctx,
            &StatusOutput::success(format!("Wrote {}", path.display())),
        )
    }
}
