//! Verify command implementation.

use clap::Parser;
use ghost_ledger::{ChainFault, Verification};
use serde::Serialize;
use tracing::warn;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Verify every block of the chain
#[derive(Debug, Parser)]
pub struct VerifyCommand {}

#[derive(Debug, Serialize)]
struct VerifyOutput {
    valid: bool,
    blocks: usize,
    difficulty: u32,
    fault: Option<ChainFault>,
    reason: String,
}

impl From<(Verification, usize, u32)> for VerifyOutput {
    fn from((verification, blocks, difficulty): (Verification, usize, u32)) -> Self {
        Self {
            valid: verification.is_valid(),
            blocks,
            difficulty,
            fault: verification.fault(),
            reason: verification.reason(),
        }
    }
}

impl FormattedOutput for VerifyOutput {
    fn format_text(&self) -> String {
        if self.valid {
            format!(
                "✓ {} ({} blocks, difficulty {})",
                self.reason, self.blocks, self.difficulty
            )
        } else {
            format!("✗ {}", self.reason)
        }
    }
}

impl VerifyCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let chain = ctx.load_chain()?;
        let verification = chain.verify();
        let output = VerifyOutput::from((verification, chain.len(), chain.difficulty()));
        print_output(ctx, &output)?;

        match verification.fault() {
            None => Ok(()),
            Some(fault) => {
                warn!(index = fault.index, kind = ?fault.kind, "chain verification failed");
                Err(CliError::verification(fault.to_string()))
            }
        }
    }
}
