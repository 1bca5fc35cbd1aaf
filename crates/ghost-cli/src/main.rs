//! GHOST CLI - tamper-evident ledger of file changes
//!
//! Main entry point for the `ghost` binary.

use std::process::ExitCode;

use clap::Parser;
use ghost_common_config::Environment;
use tracing::error;

mod cli;
mod commands;
mod error;
mod output;

use cli::Cli;
use error::CliError;

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
    IoError = 3,
    VerificationFailed = 5,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    Environment::init();

    // Logging depends on the config file, so load it first and report
    // a config failure once the subscriber is up.
    let config = cli.load_config();
    if let Err(e) = ghost_common_log::init(cli.log_config(config.as_ref().ok())) {
        eprintln!("warning: {e}");
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => return report(e),
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => return report(CliError::io("failed to create Tokio runtime", e)),
    };

    match runtime.block_on(cli.execute(config)) {
        Ok(()) => Exit::Success.into(),
        Err(e) => report(e),
    }
}

fn report(e: CliError) -> ExitCode {
    error!("{e}");
    if let Some(hint) = e.hint() {
        eprintln!("hint: {hint}");
    }
    e.exit_code()
}
