//! Record command implementation.

use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Parser, ValueHint};
use ghost_ledger::ChangeKind;
use serde::Serialize;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, short_digest, FormattedOutput};

/// Record a single change and seal it into a new block
#[derive(Debug, Parser)]
pub struct RecordCommand {
    /// File that changed
    #[arg(value_hint = ValueHint::FilePath)]
    pub path: PathBuf,

    /// Kind of change: create, modify or delete
    pub kind: ChangeKind,

    /// Use this digest instead of hashing the file
    #[arg(long, value_name = "HEX")]
    pub hash: Option<String>,
}

#[derive(Debug, Serialize)]
struct RecordOutput {
    path: String,
    kind: ChangeKind,
    digest: String,
    block_index: u64,
    nonce: u64,
    block_digest: String,
}

impl FormattedOutput for RecordOutput {
    fn format_text(&self) -> String {
        format!(
            "✓ Recorded {} {} ({}) in block #{} (nonce {}, {})",
            self.kind,
            self.path,
            short_digest(&self.digest),
            self.block_index,
            self.nonce,
            short_digest(&self.block_digest)
        )
    }
}

impl RecordCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let mut chain = ctx.load_or_create_chain()?;
        chain.stage_change(&self.path, self.kind, self.hash.clone())?;

        // Pending changes are not persisted, so seal before saving.
        let block = chain
            .commit_pending()?
            .ok_or_else(|| anyhow!("no pending change to commit"))?;
        ctx.save_chain(&chain)?;

        let record = block
            .changes()
            .last()
            .ok_or_else(|| anyhow!("block #{} carries no changes", block.index()))?;
        print_output(
            ctx,
            &RecordOutput {
                path: record.path.clone(),
                kind: record.kind,
                digest: record.digest.clone(),
                block_index: block.index(),
                nonce: block.nonce(),
                block_digest: block.digest().to_string(),
            },
        )
    }
}
