//! History command implementation.

use std::fmt::Write;
use std::path::PathBuf;

use clap::{Parser, ValueHint};
use ghost_ledger::HistoryEntry;
use serde::Serialize;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, short_digest, FormattedOutput};

/// Show every recorded change of a file
#[derive(Debug, Parser)]
pub struct HistoryCommand {
    /// Path as it was recorded
    #[arg(value_hint = ValueHint::FilePath)]
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
struct HistoryOutput {
    path: String,
    entries: Vec<HistoryEntry>,
}

impl FormattedOutput for HistoryOutput {
    fn format_text(&self) -> String {
        if self.entries.is_empty() {
            return format!("No recorded changes for {}", self.path);
        }

        let mut out = format!("History of {} ({} changes)", self.path, self.entries.len());
        for entry in &self.entries {
            let _ = write!(
                out,
                "\n  block #{:<4} {}  {:<6}  {}",
                entry.block_index,
                entry.change.timestamp_human,
                entry.change.kind.as_str(),
                short_digest(&entry.change.digest)
            );
        }
        out
    }
}

impl HistoryCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let chain = ctx.load_chain()?;
        let output = HistoryOutput {
            path: self.path.to_string_lossy().into_owned(),
            entries: chain.history_for(&self.path),
        };
        print_output(ctx, &output)
    }
}
