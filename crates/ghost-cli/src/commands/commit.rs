//! Commit command implementation.

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, ValueHint};
use ghost_ledger::ChangeKind;
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, short_digest, FormattedOutput};

/// Seal a list of changes into blocks
///
/// Each input line is `<kind> <path>`. Blank lines and lines starting
/// with `#` are ignored. A block is sealed whenever `ledger.batch_size`
/// changes are staged, and once more for the remainder.
#[derive(Debug, Parser)]
pub struct CommitCommand {
    /// File listing the changes; stdin when absent or `-`
    #[arg(short, long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub from: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CommitOutput {
    staged: usize,
    skipped: usize,
    blocks_sealed: usize,
    /// Last block sealed by this commit.
    block_index: Option<u64>,
    block_digest: Option<String>,
}

impl FormattedOutput for CommitOutput {
    fn format_text(&self) -> String {
        match (self.block_index, &self.block_digest) {
            (Some(index), Some(digest)) => format!(
                "✓ Sealed {} change(s) into {} block(s), last #{} ({}), {} skipped",
                self.staged,
                self.blocks_sealed,
                index,
                short_digest(digest),
                self.skipped
            ),
            _ => format!("Nothing to commit ({} skipped)", self.skipped),
        }
    }
}

/// Parse `<kind> <path>` lines. Malformed lines are returned as errors
/// with their 1-based line number.
fn parse_changes(input: &str) -> (Vec<(ChangeKind, String)>, Vec<String>) {
    let mut changes = Vec::new();
    let mut errors = Vec::new();

    for (number, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parsed = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| "expected `<kind> <path>`".to_string())
            .and_then(|(kind, path)| Ok((kind.parse::<ChangeKind>()?, path.trim())));

        match parsed {
            Ok((kind, path)) => changes.push((kind, path.to_string())),
            Err(e) => errors.push(format!("line {}: {e}", number + 1)),
        }
    }

    (changes, errors)
}

impl CommitCommand {
    fn read_input(&self) -> Result<String, CliError> {
        match &self.from {
            Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
                .map_err(|e| CliError::io(format!("cannot read {}", path.display()), e)),
            _ => {
                let mut input = String::new();
                std::io::stdin()
                    .read_to_string(&mut input)
                    .map_err(|e| CliError::io("cannot read stdin", e))?;
                Ok(input)
            }
        }
    }

    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let (changes, errors) = parse_changes(&self.read_input()?);
        let mut skipped = errors.len();
        for error in &errors {
            warn!("{error}");
        }

        let mut chain = ctx.load_or_create_chain()?;
        let mut staged = 0;
        let mut sealed = Vec::new();
        for (kind, path) in changes {
            match chain.stage_change(&path, kind, None) {
                Ok(due) => {
                    staged += 1;
                    if due {
                        sealed.extend(chain.commit_pending()?);
                    }
                }
                Err(e) => {
                    warn!(path = %path, kind = %kind, error = %e, "change skipped");
                    skipped += 1;
                }
            }
        }
        sealed.extend(chain.commit_pending()?);

        if sealed.is_empty() {
            info!("nothing to commit");
        } else {
            ctx.save_chain(&chain)?;
        }
        let block = sealed.last();

        print_output(
            ctx,
            &CommitOutput {
                staged,
                skipped,
                blocks_sealed: sealed.len(),
                block_index: block.map(|b| b.index()),
                block_digest: block.map(|b| b.digest().to_string()),
            },
        )
    }
}
