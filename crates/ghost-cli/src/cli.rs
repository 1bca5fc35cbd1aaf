//! CLI argument definitions using clap derive macros.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use ghost_common_config::{vars, ConfigLoader, Environment, GhostConfig};
use ghost_common_log::{LogConfig, LogFormat, LogLevel};
use ghost_ledger::{codec, Chain, ChainBuilder};

use crate::commands::{
    AuditCommand, CheckCommand, CommitCommand, HistoryCommand, InitCommand, MonitorCommand,
    RecordCommand, SummaryCommand, VerifyCommand,
};
use crate::error::CliError;

/// GHOST - tamper-evident ledger of file changes
///
/// Records file-system changes into a hash-chained, proof-of-work sealed
/// ledger and checks files against it.
#[derive(Debug, Parser)]
#[command(
    name = "ghost",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv)
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase verbosity level"
    )]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Suppress non-error log output"
    )]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = vars::GHOST_CONFIG_PATH,
        value_hint = ValueHint::FilePath,
        help = "Path to configuration file"
    )]
    pub config: Option<PathBuf>,

    /// Chain file, overriding `ledger.chain_file`
    #[arg(
        long,
        global = true,
        env = vars::GHOST_CHAIN_FILE,
        value_hint = ValueHint::FilePath,
        help = "Path to the chain file"
    )]
    pub chain: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        help = "Output format (text, json)"
    )]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a default .ghost/config.yaml
    Init(InitCommand),

    /// Watch a directory and record every change
    #[command(visible_alias = "watch")]
    Monitor(MonitorCommand),

    /// Record a single change and seal it
    Record(RecordCommand),

    /// Seal a batch of changes read from a file or stdin
    Commit(CommitCommand),

    /// Verify the whole chain
    Verify(VerifyCommand),

    /// Show every recorded change of a file
    History(HistoryCommand),

    /// Compare a file with its last recorded digest
    Check(CheckCommand),

    /// Check every tracked file
    Audit(AuditCommand),

    /// Chain overview with the most recent blocks
    Summary(SummaryCommand),
}

impl Cli {
    /// Load configuration from `--config`, or `.ghost/config.yaml` in the
    /// current directory, then apply environment overrides.
    pub fn load_config(&self) -> Result<GhostConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => {
                let project_dir = path.parent().unwrap_or_else(|| Path::new("."));
                ConfigLoader::new(project_dir).load_file(path)?
            }
            None => ConfigLoader::default().load()?,
        };

        let difficulty = Environment::get_int::<u32>(vars::GHOST_DIFFICULTY)
            .map_err(|e| CliError::config(e.to_string()))?;
        if let Some(difficulty) = difficulty {
            config.ledger.difficulty = difficulty;
            ConfigLoader::default().validate(&config)?;
        }

        Ok(config)
    }

    /// Logging setup: config file, then `GHOST_LOG_*`, then `-v`/`-q`.
    pub fn log_config(&self, config: Option<&GhostConfig>) -> LogConfig {
        let mut log = LogConfig::default();
        if let Some(config) = config {
            log.level = LogLevel::parse(&config.logging.level).unwrap_or_default();
            log.format = LogFormat::parse(&config.logging.format);
            log.file_path = config.logging.file.clone();
        }

        log = log.apply_env();

        match self.verbose {
            0 if self.quiet => log.level = LogLevel::Error,
            0 => {}
            1 => log.level = LogLevel::Debug,
            _ => {
                log.level = LogLevel::Trace;
                log.source_location = true;
            }
        }
        log
    }

    /// Execute the selected command
    pub async fn execute(self, config: GhostConfig) -> Result<(), CliError> {
        let chain_file = self
            .chain
            .clone()
            .unwrap_or_else(|| config.ledger.chain_file.clone());

        let ctx = CommandContext {
            format: self.format,
            config,
            chain_file,
        };

        match self.command {
            Command::Init(cmd) => cmd.execute(&ctx).await,
            Command::Monitor(cmd) => cmd.execute(&ctx).await,
            Command::Record(cmd) => cmd.execute(&ctx).await,
            Command::Commit(cmd) => cmd.execute(&ctx).await,
            Command::Verify(cmd) => cmd.execute(&ctx).await,
            Command::History(cmd) => cmd.execute(&ctx).await,
            Command::Check(cmd) => cmd.execute(&ctx).await,
            Command::Audit(cmd) => cmd.execute(&ctx).await,
            Command::Summary(cmd) => cmd.execute(&ctx).await,
        }
    }
}

/// Shared context for command execution
#[derive(Debug)]
pub struct CommandContext {
    pub format: OutputFormat,
    pub config: GhostConfig,
    /// Resolved chain file.
    pub chain_file: PathBuf,
}

impl CommandContext {
    pub fn builder(&self) -> ChainBuilder {
        ChainBuilder::from_config(&self.config.ledger)
    }

    /// Load the existing chain; a missing file is an error.
    pub fn load_chain(&self) -> Result<Chain, CliError> {
        Ok(codec::load(&self.chain_file, self.builder())?)
    }

    /// Load the existing chain or mint a new one.
    pub fn load_or_create_chain(&self) -> Result<Chain, CliError> {
        Ok(codec::load_or_create(&self.chain_file, self.builder())?)
    }

    pub fn save_chain(&self, chain: &Chain) -> Result<(), CliError> {
        Ok(codec::save(chain, &self.chain_file)?)
    }
}
