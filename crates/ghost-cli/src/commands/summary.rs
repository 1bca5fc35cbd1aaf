//! Summary command implementation.

use std::fmt::Write;

use clap::Parser;
use ghost_ledger::chain::SUMMARY_RECENT_BLOCKS;
use ghost_ledger::ChainSummary;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, short_digest, FormattedOutput};

/// Chain overview with the most recent blocks
#[derive(Debug, Parser)]
pub struct SummaryCommand {
    /// Number of recent blocks to list
    #[arg(short = 'n', long, default_value_t = SUMMARY_RECENT_BLOCKS)]
    pub recent: usize,
}

impl SummaryCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let chain = ctx.load_chain()?;
        print_output(ctx, &chain.summary(self.recent))
    }
}

impl FormattedOutput for ChainSummary {
    fn format_text(&self) -> String {
        let mark = if self.verification.is_valid() { "✓" } else { "✗" };
        let mut out = String::new();
        let _ = writeln!(out, "GHOST integrity ledger");
        let _ = writeln!(out, "  Blocks:      {}", self.total_blocks);
        let _ = writeln!(out, "  Pending:     {}", self.pending_changes);
        let _ = writeln!(out, "  Difficulty:  {}", self.difficulty);
        let _ = write!(out, "  Status:      {mark} {}", self.reason);

        if !self.recent_blocks.is_empty() {
            let _ = write!(out, "\n\nRecent blocks:");
            for block in &self.recent_blocks {
                let _ = write!(
                    out,
                    "\n  #{:<4} {}  {:>3} change(s)  {}",
                    block.index,
                    block.created_at,
                    block.changes,
                    short_digest(&block.digest)
                );
            }
        }
        out
    }
}
