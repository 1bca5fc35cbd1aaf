//! Asynchronous single writer for a shared chain.
//!
//! Events are staged as they arrive. When a batch is due, one candidate
//! block is drained and sealed on the blocking pool while staging
//! continues. At most one seal is in flight, so blocks are applied in the
//! order their candidates were drained.

use crate::error::Result;
use crate::watcher::ChangeEvent;
use ghost_ledger::{Block, SealError, SharedChain, UnsealedBlock};
use std::future::Future;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

/// A seal running on the blocking pool. The writer keeps its own copy of
/// the candidate so the changes survive a panicking sealer.
struct InFlight {
    candidate: UnsealedBlock,
    handle: JoinHandle<std::result::Result<Block, SealError>>,
}

/// Counters reported when the writer stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Events staged into the chain.
    pub recorded: usize,
    /// Events dropped because the file could not be hashed.
    pub skipped: usize,
    pub blocks_sealed: usize,
    pub seal_failures: usize,
    /// Changes still pending after the final flush.
    pub unsealed: usize,
}

/// Drives a [`SharedChain`] from a stream of change events.
#[derive(Debug, Clone)]
pub struct LedgerWriter {
    chain: SharedChain,
    chain_file: Option<PathBuf>,
}

impl LedgerWriter {
    pub fn new(chain: SharedChain) -> Self {
        Self {
            chain,
            chain_file: None,
        }
    }

    /// Persist the chain to `path` after every sealed block and on exit.
    pub fn with_chain_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.chain_file = Some(path.into());
        self
    }

    pub fn chain(&self) -> &SharedChain {
        &self.chain
    }

    /// Consume events until the channel closes or `shutdown` resolves,
    /// then seal whatever is pending and save.
    ///
    /// On shutdown the channel is closed and events already queued are
    /// still staged before the final seal.
    pub async fn run<S>(
        self,
        mut events: mpsc::Receiver<ChangeEvent>,
        shutdown: S,
    ) -> Result<WriterStats>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut stats = WriterStats::default();
        let mut in_flight: Option<InFlight> = None;
        // Set after a failed seal so a timeout is not retried until new input arrives.
        let mut hold = false;

        loop {
            if in_flight.is_none() && !hold && self.chain.batch_due() {
                in_flight = self.start_seal();
            }

            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        self.stage(event, &mut stats).await;
                        hold = false;
                    }
                    None => {
                        debug!("event channel closed");
                        break;
                    }
                },
                joined = wait(&mut in_flight), if in_flight.is_some() => {
                    if let Some(InFlight { candidate, .. }) = in_flight.take() {
                        if !self.finish_seal(candidate, joined, &mut stats)? {
                            hold = true;
                        }
                    }
                }
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    events.close();
                    let mut drained = 0usize;
                    while let Some(event) = events.recv().await {
                        self.stage(event, &mut stats).await;
                        drained += 1;
                    }
                    debug!(drained, "queued events staged");
                    break;
                }
            }
        }

        if let Some(InFlight { candidate, handle }) = in_flight.take() {
            let joined = handle.await;
            self.finish_seal(candidate, joined, &mut stats)?;
        }
        if let Some(InFlight { candidate, handle }) = self.start_seal() {
            let joined = handle.await;
            self.finish_seal(candidate, joined, &mut stats)?;
        }

        stats.unsealed = self.chain.pending_len();
        self.save()?;
        info!(
            recorded = stats.recorded,
            skipped = stats.skipped,
            blocks = stats.blocks_sealed,
            unsealed = stats.unsealed,
            "writer stopped"
        );
        Ok(stats)
    }

    /// Hash and stage one event on the blocking pool.
    async fn stage(&self, event: ChangeEvent, stats: &mut WriterStats) {
        let chain = self.chain.clone();
        let ChangeEvent { path, kind } = event;
        let staged_path = path.clone();
        let staged = tokio::task::spawn_blocking(move || {
            chain.stage_change(&staged_path, kind, None).map(|_| ())
        })
        .await;

        let error = match staged {
            Ok(Ok(())) => {
                stats.recorded += 1;
                return;
            }
            Ok(Err(e)) => e.to_string(),
            Err(e) => e.to_string(),
        };
        warn!(
            path = %path.display(),
            kind = %kind,
            error = %error,
            "change skipped"
        );
        stats.skipped += 1;
    }

    fn start_seal(&self) -> Option<InFlight> {
        let (candidate, sealer, difficulty) = self.chain.prepare_commit()?;
        info!(
            index = candidate.index,
            changes = candidate.payload.records().len(),
            difficulty,
            "mining block"
        );
        let job = candidate.clone();
        let handle = tokio::task::spawn_blocking(move || sealer.seal(&job, difficulty));
        Some(InFlight { candidate, handle })
    }

    /// Apply a finished seal. Returns false when the seal failed and the
    /// candidate's changes were requeued.
    fn finish_seal(
        &self,
        candidate: UnsealedBlock,
        joined: std::result::Result<std::result::Result<Block, SealError>, JoinError>,
        stats: &mut WriterStats,
    ) -> Result<bool> {
        let result = match joined {
            Ok(result) => result,
            Err(e) => {
                warn!(index = candidate.index, error = %e, "seal task died, changes requeued");
                self.chain.requeue(candidate);
                stats.seal_failures += 1;
                return Ok(false);
            }
        };

        match result {
            Ok(block) => {
                let (index, nonce) = (block.index(), block.nonce());
                if let Err(e) = self.chain.apply_sealed(block) {
                    self.chain.requeue(candidate);
                    return Err(e.into());
                }
                info!(index, nonce, "block mined");
                stats.blocks_sealed += 1;
                self.save()?;
                Ok(true)
            }
            Err(e) => {
                warn!(index = candidate.index, error = %e, "sealing failed, changes requeued");
                self.chain.requeue(candidate);
                stats.seal_failures += 1;
                if e.is_retryable() {
                    Ok(false)
                } else {
                    Err(ghost_ledger::LedgerError::from(e).into())
                }
            }
        }
    }

    fn save(&self) -> Result<()> {
        if let Some(path) = &self.chain_file {
            self.chain.save(path)?;
        }
        Ok(())
    }
}

async fn wait(
    in_flight: &mut Option<InFlight>,
) -> std::result::Result<std::result::Result<Block, SealError>, JoinError> {
    match in_flight {
        Some(f) => (&mut f.handle).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghost_ledger::{Chain, ChangeKind};

    fn chain() -> SharedChain {
        Chain::builder().difficulty(0).create().unwrap().into()
    }

    #[test]
    fn test_closed_channel_flushes_pending() {
        let chain = chain();
        let (tx, rx) = mpsc::channel(4);
        tokio_test::block_on(async {
            tx.send(ChangeEvent::new("old.txt", ChangeKind::Delete))
                .await
                .unwrap();
        });
        drop(tx);

        let stats = tokio_test::assert_ok!(tokio_test::block_on(
            LedgerWriter::new(chain.clone()).run(rx, std::future::pending())
        ));
        assert_eq!(stats.recorded, 1);
        assert_eq!(stats.blocks_sealed, 1);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_idle_writer_seals_nothing() {
        let chain = chain();
        let (_tx, rx) = mpsc::channel::<ChangeEvent>(4);

        let stats = tokio_test::block_on(LedgerWriter::new(chain.clone()).run(rx, async {}))
            .unwrap();
        assert_eq!(stats, WriterStats::default());
        assert_eq!(chain.len(), 1);
    }
}
