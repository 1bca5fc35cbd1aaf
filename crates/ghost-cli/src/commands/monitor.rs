//! Monitor command implementation.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use clap::{Parser, ValueHint};
use ghost_capture::{run_monitor, MonitorOptions, WriterStats};
use ghost_ledger::chain::SUMMARY_RECENT_BLOCKS;
use ghost_ledger::{ChainSummary, SharedChain};
use serde::Serialize;
use tracing::warn;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Watch a directory and record every change
#[derive(Debug, Parser)]
pub struct MonitorCommand {
    /// Directory to watch
    #[arg(default_value = ".", value_hint = ValueHint::DirPath)]
    pub dir: PathBuf,

    /// Seconds to watch; 0 runs until Ctrl-C [default: monitor.duration_secs]
    #[arg(short, long, value_name = "SECS")]
    pub duration: Option<u64>,

    /// Watch subdirectories too
    #[arg(short, long)]
    pub recursive: bool,
}

#[derive(Debug, Serialize)]
struct MonitorOutput {
    recorded: usize,
    skipped: usize,
    blocks_sealed: usize,
    seal_failures: usize,
    unsealed: usize,
    summary: ChainSummary,
}

impl MonitorOutput {
    fn new(stats: WriterStats, summary: ChainSummary) -> Self {
        Self {
            recorded: stats.recorded,
            skipped: stats.skipped,
            blocks_sealed: stats.blocks_sealed,
            seal_failures: stats.seal_failures,
            unsealed: stats.unsealed,
            summary,
        }
    }
}

impl FormattedOutput for MonitorOutput {
    fn format_text(&self) -> String {
        let mut out = format!(
            "Recorded {} change(s) into {} new block(s)",
            self.recorded, self.blocks_sealed
        );
        if self.skipped > 0 {
            out.push_str(&format!(", {} skipped", self.skipped));
        }
        if self.unsealed > 0 {
            out.push_str(&format!(", {} left unsealed", self.unsealed));
        }
        out.push_str("\n\n");
        out.push_str(&self.summary.format_text());
        out
    }
}

impl MonitorCommand {
    fn options(&self, ctx: &CommandContext) -> Result<MonitorOptions, CliError> {
        let mut options = MonitorOptions::from_config(&self.dir, &ctx.config.monitor)?;
        options.recursive |= self.recursive;
        if let Some(secs) = self.duration {
            options.duration = (secs > 0).then(|| Duration::from_secs(secs));
        }
        options.chain_file = Some(ctx.chain_file.clone());
        Ok(options)
    }

    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let options = self.options(ctx)?;
        let chain = ctx.load_or_create_chain()?;
        let verification = chain.verify();
        if !verification.is_valid() {
            warn!(reason = %verification.reason(), "existing chain does not verify");
        }

        let chain = SharedChain::from(chain);
        let stats = run_monitor(chain.clone(), options, interrupted()).await?;
        let unsealed = stats.unsealed;

        print_output(
            ctx,
            &MonitorOutput::new(stats, chain.summary(SUMMARY_RECENT_BLOCKS)),
        )?;

        if unsealed > 0 {
            return Err(anyhow!("{unsealed} change(s) could not be sealed and were not saved").into());
        }
        Ok(())
    }
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
