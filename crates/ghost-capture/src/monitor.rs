//! Bounded directory monitoring session.

use crate::error::Result;
use crate::filter::IgnoreFilter;
use crate::watcher::DirectoryWatcher;
use crate::writer::{LedgerWriter, WriterStats};
use ghost_common_config::MonitorConfig;
use ghost_common_log::spans::Timer;
use ghost_ledger::SharedChain;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// What to watch and for how long.
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub root: PathBuf,
    pub recursive: bool,
    /// Stop after this long. Runs until `stop` resolves when absent.
    pub duration: Option<Duration>,
    pub channel_capacity: usize,
    pub filter: IgnoreFilter,
    pub chain_file: Option<PathBuf>,
}

impl MonitorOptions {
    /// Options for `root` from the `monitor` config section.
    pub fn from_config(root: impl Into<PathBuf>, config: &MonitorConfig) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            recursive: config.recursive,
            duration: Some(Duration::from_secs(config.duration_secs)),
            channel_capacity: config.channel_capacity.max(1),
            filter: IgnoreFilter::from_config(config)?,
            chain_file: None,
        })
    }
}

/// Watch `options.root` and record every change into `chain` until the
/// duration elapses or `stop` resolves. Pending changes are committed and
/// the chain saved before returning.
pub async fn run_monitor<S>(
    chain: SharedChain,
    options: MonitorOptions,
    stop: S,
) -> Result<WriterStats>
where
    S: Future<Output = ()>,
{
    let (tx, rx) = mpsc::channel(options.channel_capacity);
    let watcher =
        DirectoryWatcher::spawn(&options.root, options.recursive, options.filter, tx)?;
    info!(
        root = %watcher.root().display(),
        recursive = options.recursive,
        duration_secs = options.duration.map(|d| d.as_secs()),
        "monitoring started"
    );

    let mut writer = LedgerWriter::new(chain);
    if let Some(path) = options.chain_file {
        writer = writer.with_chain_file(path);
    }

    let duration = options.duration;
    let shutdown = async move {
        match duration {
            Some(d) => {
                tokio::select! {
                    _ = tokio::time::sleep(d) => {}
                    _ = stop => {}
                }
            }
            None => stop.await,
        }
    };

    let timer = Timer::start("monitor");
    let stats = writer.run(rx, shutdown).await;
    drop(watcher);
    let elapsed = timer.finish();
    info!(elapsed_secs = elapsed.as_secs(), "monitoring stopped");
    stats
}
