//! Audit command implementation.

use std::fmt::Write;

use clap::Parser;
use ghost_ledger::{AuditReport, LiveStatus};
use tracing::warn;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Check every tracked file against its last record
#[derive(Debug, Parser)]
pub struct AuditCommand {
    /// Only list files that need attention
    #[arg(long)]
    pub alerts_only: bool,
}

impl AuditCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let chain = ctx.load_chain()?;
        let mut report = ghost_ledger::audit(&chain);
        let alerts = report.alerts().count();
        let clean = report.is_clean();

        if self.alerts_only {
            report.files.retain(|f| f.status.is_alert());
        }
        print_output(ctx, &report)?;

        if clean {
            return Ok(());
        }
        warn!(alerts, chain_valid = report.verification.is_valid(), "audit found problems");
        Err(CliError::verification(if report.verification.is_valid() {
            format!("{alerts} tracked file(s) need attention")
        } else {
            report.verification.reason()
        }))
    }
}

impl FormattedOutput for AuditReport {
    fn format_text(&self) -> String {
        let mark = if self.verification.is_valid() { "✓" } else { "✗" };
        let mut out = format!(
            "{mark} {} ({} blocks, {} files listed)",
            self.verification.reason(),
            self.total_blocks,
            self.files.len()
        );

        for file in &self.files {
            let status = match &file.status {
                LiveStatus::Verified => "verified".to_string(),
                LiveStatus::DeletedRecorded => "deleted".to_string(),
                LiveStatus::Tampered { .. } => "TAMPERED".to_string(),
                LiveStatus::MissingUnexpectedly => "MISSING".to_string(),
                LiveStatus::Unreadable { reason } => format!("UNREADABLE ({reason})"),
            };
            let _ = write!(
                out,
                "\n  {:<10} {}  ({} changes, last {} in block #{} at {})",
                status, file.path, file.changes, file.last_kind, file.last_block, file.last_recorded
            );
        }
        out
    }
}
