//! Check command implementation.

use std::path::PathBuf;

use clap::{Parser, ValueHint};
use ghost_ledger::TamperStatus;
use serde::Serialize;
use tracing::warn;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, short_digest, FormattedOutput};

/// Compare a file with its last recorded digest
#[derive(Debug, Parser)]
pub struct CheckCommand {
    /// Path as it was recorded
    #[arg(value_hint = ValueHint::FilePath)]
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
struct CheckOutput {
    path: String,
    #[serde(flatten)]
    status: TamperStatus,
}

impl CheckOutput {
    fn is_alert(&self) -> bool {
        matches!(
            self.status,
            TamperStatus::Tampered { .. } | TamperStatus::FileMissing { .. }
        )
    }
}

impl FormattedOutput for CheckOutput {
    fn format_text(&self) -> String {
        let path = &self.path;
        match &self.status {
            TamperStatus::NotTracked => format!("{path}: not tracked"),
            TamperStatus::Verified => format!("✓ {path}: matches recorded digest"),
            TamperStatus::DeletedRecorded => format!("✓ {path}: deleted, as recorded"),
            TamperStatus::Tampered { recorded, current } => format!(
                "✗ {path}: TAMPERED (recorded {}, now {})",
                short_digest(recorded),
                short_digest(current)
            ),
            TamperStatus::FileMissing { recorded } => format!(
                "✗ {path}: missing, last recorded digest {}",
                short_digest(recorded)
            ),
        }
    }
}

impl CheckCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let chain = ctx.load_chain()?;
        let output = CheckOutput {
            path: self.path.to_string_lossy().into_owned(),
            status: chain.detect_tampering(&self.path)?,
        };
        print_output(ctx, &output)?;

        if output.is_alert() {
            warn!(path = %output.path, "file does not match the ledger");
            return Err(CliError::verification(format!(
                "{} does not match the ledger",
                output.path
            )));
        }
        Ok(())
    }
}
