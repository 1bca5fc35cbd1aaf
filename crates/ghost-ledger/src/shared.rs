//! Shared handle to a single-writer chain.

use crate::audit::{self, AuditReport};
use crate::block::{Block, ChangeKind, UnsealedBlock};
use crate::chain::{Chain, ChainSummary, HistoryEntry, TamperStatus, Verification};
use crate::codec;
use crate::error::Result;
use crate::sealer::Sealer;
use parking_lot::{RwLock, RwLockReadGuard};
use std::path::Path;
use std::sync::Arc;

/// A chain behind a read-write lock.
///
/// Mutations take the write lock for their whole duration so readers
/// never see a block half appended. File content is hashed before the
/// lock is taken. Reads may run concurrently.
#[derive(Debug, Clone)]
pub struct SharedChain {
    inner: Arc<RwLock<Chain>>,
}

impl SharedChain {
    pub fn new(chain: Chain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    /// Read access to the chain.
    pub fn read(&self) -> RwLockReadGuard<'_, Chain> {
        self.inner.read()
    }

    pub fn record_change(
        &self,
        path: impl AsRef<Path>,
        kind: ChangeKind,
        digest_override: Option<String>,
    ) -> Result<Option<Block>> {
        let digest = self.resolve_digest(path.as_ref(), kind, digest_override)?;
        self.inner.write().record_change(path, kind, digest)
    }

    pub fn stage_change(
        &self,
        path: impl AsRef<Path>,
        kind: ChangeKind,
        digest_override: Option<String>,
    ) -> Result<bool> {
        let digest = self.resolve_digest(path.as_ref(), kind, digest_override)?;
        self.inner.write().stage_change(path, kind, digest)
    }

    /// Hash the file under no lock when the caller supplied no digest.
    fn resolve_digest(
        &self,
        path: &Path,
        kind: ChangeKind,
        digest_override: Option<String>,
    ) -> Result<Option<String>> {
        match (kind, digest_override) {
            (ChangeKind::Delete, digest) | (_, digest @ Some(_)) => Ok(digest),
            (_, None) => {
                let hasher = self.inner.read().hasher();
                hasher.digest_file(path).map(Some)
            }
        }
    }

    pub fn commit_pending(&self) -> Result<Option<Block>> {
        self.inner.write().commit_pending()
    }

    /// Drain pending into a candidate along with what is needed to seal it.
    pub fn prepare_commit(&self) -> Option<(UnsealedBlock, Arc<dyn Sealer>, u32)> {
        let mut chain = self.inner.write();
        let candidate = chain.prepare_commit()?;
        Some((candidate, chain.sealer(), chain.difficulty()))
    }

    pub fn apply_sealed(&self, block: Block) -> Result<u64> {
        let mut chain = self.inner.write();
        chain.apply_sealed(block).map(|b| b.index())
    }

    pub fn requeue(&self, candidate: UnsealedBlock) {
        self.inner.write().requeue(candidate);
    }

    pub fn pending_len(&self) -> usize {
        self.inner.read().pending().len()
    }

    pub fn batch_due(&self) -> bool {
        self.inner.read().batch_due()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn verify(&self) -> Verification {
        self.inner.read().verify()
    }

    pub fn history_for(&self, path: impl AsRef<Path>) -> Vec<HistoryEntry> {
        self.inner.read().history_for(path)
    }

    pub fn detect_tampering(&self, path: impl AsRef<Path>) -> Result<TamperStatus> {
        self.inner.read().detect_tampering(path)
    }

    pub fn audit(&self) -> AuditReport {
        audit::audit(&self.inner.read())
    }

    pub fn summary(&self, recent: usize) -> ChainSummary {
        self.inner.read().summary(recent)
    }

    /// Persist under the read lock.
    pub fn save(&self, path: &Path) -> Result<()> {
        codec::save(&self.inner.read(), path)
    }
}

impl From<Chain> for SharedChain {
    fn from(chain: Chain) -> Self {
        Self::new(chain)
    }
}
