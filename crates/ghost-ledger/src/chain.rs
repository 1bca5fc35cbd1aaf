//! The append-only ledger.

use crate::block::{
    meets_difficulty, Block, BlockPayload, ChangeKind, ChangeRecord, UnsealedBlock,
    GENESIS_PREVIOUS, MAX_DIFFICULTY,
};
use crate::error::{LedgerError, Result};
use crate::hasher::{ContentHasher, Sha256FileHasher, DELETED};
use crate::sealer::{NonceSearch, Sealer};
use ghost_common_config::LedgerConfig;
use ghost_common_core::Timestamp;
use ghost_common_log::spans::{seal_span, Timer};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Default pending-change count that triggers a commit.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default difficulty.
pub const DEFAULT_DIFFICULTY: u32 = 2;

/// Number of blocks listed in a summary.
pub const SUMMARY_RECENT_BLOCKS: usize = 5;

/// What `verify` found wrong with a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Stored digest differs from the recomputed one.
    HashMismatch,
    /// `previous_hash` differs from the prior block's digest.
    ChainBroken,
    /// Digest lacks the required leading zeros.
    InvalidProofOfWork,
}

/// First failing block found by `verify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainFault {
    pub index: u64,
    pub kind: FaultKind,
}

impl fmt::Display for ChainFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FaultKind::HashMismatch => write!(f, "Block {} hash mismatch - tampered", self.index),
            FaultKind::ChainBroken => write!(f, "Block {} chain broken - tampered", self.index),
            FaultKind::InvalidProofOfWork => {
                write!(f, "Block {} invalid proof of work", self.index)
            }
        }
    }
}

/// Outcome of `Chain::verify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verification {
    Valid,
    Compromised(ChainFault),
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn fault(&self) -> Option<ChainFault> {
        match self {
            Self::Valid => None,
            Self::Compromised(fault) => Some(*fault),
        }
    }

    /// Human-readable reason.
    pub fn reason(&self) -> String {
        match self {
            Self::Valid => "Blockchain integrity verified".to_string(),
            Self::Compromised(fault) => fault.to_string(),
        }
    }
}

/// One entry of a file's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub block_index: u64,
    pub change: ChangeRecord,
}

/// Live state of a tracked file compared to its last record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TamperStatus {
    /// No record mentions the path.
    NotTracked,
    /// Content matches the last recorded digest.
    Verified,
    /// Content differs from the last recorded digest.
    Tampered { recorded: String, current: String },
    /// The file is gone but its last record was not a delete.
    FileMissing { recorded: String },
    /// The last record was a delete and the file is gone.
    DeletedRecorded,
}

impl TamperStatus {
    pub fn is_tampered(&self) -> bool {
        matches!(self, Self::Tampered { .. })
    }
}

/// Compact view of one block for summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockSummary {
    pub index: u64,
    pub created_at: String,
    pub changes: usize,
    pub digest: String,
}

/// Chain overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainSummary {
    pub total_blocks: usize,
    pub pending_changes: usize,
    pub difficulty: u32,
    pub verification: Verification,
    pub reason: String,
    pub recent_blocks: Vec<BlockSummary>,
}

/// Builder for [`Chain`].
#[derive(Clone)]
pub struct ChainBuilder {
    difficulty: u32,
    batch_size: usize,
    sealer: Arc<dyn Sealer>,
    hasher: Arc<dyn ContentHasher>,
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            batch_size: DEFAULT_BATCH_SIZE,
            sealer: Arc::new(NonceSearch::new()),
            hasher: Arc::new(Sha256FileHasher),
        }
    }
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder from the `ledger` config section.
    pub fn from_config(config: &LedgerConfig) -> Self {
        let sealer = match config.max_seal_attempts {
            Some(max) => NonceSearch::with_max_attempts(max),
            None => NonceSearch::new(),
        };
        Self::new()
            .difficulty(config.difficulty)
            .batch_size(config.batch_size)
            .sealer(sealer)
    }

    pub fn difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn sealer(mut self, sealer: impl Sealer + 'static) -> Self {
        self.sealer = Arc::new(sealer);
        self
    }

    pub fn hasher(mut self, hasher: impl ContentHasher + 'static) -> Self {
        self.hasher = Arc::new(hasher);
        self
    }

    /// Mint a new chain with a sealed genesis block.
    pub fn create(self) -> Result<Chain> {
        let difficulty = self.difficulty;
        check_difficulty(difficulty)?;

        let now = Timestamp::now();
        let candidate = UnsealedBlock::new(
            0,
            now.epoch_secs(),
            BlockPayload::genesis(now.to_human()),
            GENESIS_PREVIOUS,
        );
        let genesis = {
            let _span = seal_span(0, difficulty).entered();
            self.sealer.seal(&candidate, difficulty)?
        };
        info!(
            difficulty,
            nonce = genesis.nonce(),
            digest = %genesis.digest(),
            "genesis block created"
        );

        Ok(self.assemble(difficulty, vec![genesis]))
    }

    /// Rebuild a chain from persisted blocks, trusting their digests.
    pub fn restore(self, difficulty: u32, blocks: Vec<Block>) -> Result<Chain> {
        check_difficulty(difficulty)?;
        if blocks.is_empty() {
            return Err(LedgerError::EmptyChain);
        }
        Ok(self.assemble(difficulty, blocks))
    }

    fn assemble(self, difficulty: u32, blocks: Vec<Block>) -> Chain {
        Chain {
            blocks,
            pending: Vec::new(),
            difficulty,
            batch_size: self.batch_size,
            sealer: self.sealer,
            hasher: self.hasher,
        }
    }
}

impl fmt::Debug for ChainBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainBuilder")
            .field("difficulty", &self.difficulty)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

fn check_difficulty(difficulty: u32) -> Result<()> {
    if difficulty > MAX_DIFFICULTY {
        return Err(LedgerError::InvalidDifficulty(difficulty));
    }
    Ok(())
}

/// Append-only, hash-linked sequence of sealed blocks plus a buffer of
/// changes waiting to be sealed.
///
/// `blocks` is never empty and `blocks[0]` is the genesis block.
pub struct Chain {
    blocks: Vec<Block>,
    pending: Vec<ChangeRecord>,
    difficulty: u32,
    batch_size: usize,
    sealer: Arc<dyn Sealer>,
    hasher: Arc<dyn ContentHasher>,
}

impl Chain {
    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    /// New chain at `difficulty` with default settings.
    pub fn create(difficulty: u32) -> Result<Self> {
        Self::builder().difficulty(difficulty).create()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn pending(&self) -> &[ChangeRecord] {
        &self.pending
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Sealed block count.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Sealer used by `commit_pending`.
    pub fn sealer(&self) -> Arc<dyn Sealer> {
        Arc::clone(&self.sealer)
    }

    /// Hasher used for changes recorded without a digest.
    pub fn hasher(&self) -> Arc<dyn ContentHasher> {
        Arc::clone(&self.hasher)
    }

    /// Tip of the chain.
    pub fn latest(&self) -> Result<&Block> {
        self.blocks.last().ok_or(LedgerError::EmptyChain)
    }

    /// Record a change and commit if the batch is full.
    ///
    /// Returns the sealed block when this change triggered a commit.
    pub fn record_change(
        &mut self,
        path: impl AsRef<Path>,
        kind: ChangeKind,
        digest_override: Option<String>,
    ) -> Result<Option<Block>> {
        if self.stage_change(path, kind, digest_override)? {
            self.commit_pending()
        } else {
            Ok(None)
        }
    }

    /// Buffer a change without sealing. Returns whether a batch is due.
    pub fn stage_change(
        &mut self,
        path: impl AsRef<Path>,
        kind: ChangeKind,
        digest_override: Option<String>,
    ) -> Result<bool> {
        let record = self.make_record(path.as_ref(), kind, digest_override)?;
        info!(path = %record.path, kind = %record.kind, "change recorded");
        self.pending.push(record);
        Ok(self.batch_due())
    }

    /// Whether pending has reached the batch size.
    pub fn batch_due(&self) -> bool {
        self.pending.len() >= self.batch_size
    }

    fn make_record(
        &self,
        path: &Path,
        kind: ChangeKind,
        digest_override: Option<String>,
    ) -> Result<ChangeRecord> {
        let path_str = path.to_string_lossy().into_owned();
        let digest = match (kind, digest_override) {
            (ChangeKind::Delete, _) => DELETED.to_string(),
            (_, Some(d)) if d == DELETED => {
                return Err(LedgerError::InvalidChange {
                    path: path_str,
                    reason: format!("digest \"{DELETED}\" is reserved for delete events"),
                })
            }
            (_, Some(d)) => d,
            (_, None) => self.hasher.digest_file(path)?,
        };

        let now = Timestamp::now();
        Ok(ChangeRecord {
            path: path_str,
            digest,
            kind,
            timestamp: now.epoch_secs(),
            timestamp_human: now.to_human(),
        })
    }

    /// Seal all pending changes into a new block.
    ///
    /// On failure the changes stay pending and the chain is unchanged.
    pub fn commit_pending(&mut self) -> Result<Option<Block>> {
        let Some(candidate) = self.prepare_commit() else {
            return Ok(None);
        };

        info!(
            index = candidate.index,
            changes = candidate.payload.records().len(),
            difficulty = self.difficulty,
            "mining block"
        );
        let timer = Timer::start("seal");
        let sealed = {
            let _span = seal_span(candidate.index, self.difficulty).entered();
            self.sealer.seal(&candidate, self.difficulty)
        };
        let elapsed = timer.finish();

        match sealed {
            Ok(block) => {
                info!(
                    index = block.index(),
                    nonce = block.nonce(),
                    digest = %block.digest(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "block mined"
                );
                self.apply_sealed(block.clone())?;
                Ok(Some(block))
            }
            Err(e) => {
                warn!(index = candidate.index, error = %e, "sealing failed, changes requeued");
                self.requeue(candidate);
                Err(e.into())
            }
        }
    }

    /// Drain pending into a candidate block extending the current tip.
    ///
    /// Only one candidate may be outstanding at a time: the next one is
    /// prepared after this one is applied or requeued.
    pub fn prepare_commit(&mut self) -> Option<UnsealedBlock> {
        if self.pending.is_empty() {
            return None;
        }
        let previous = self.blocks.last()?.digest().to_string();
        let changes = std::mem::take(&mut self.pending);
        let now = Timestamp::now();

        Some(UnsealedBlock::new(
            self.blocks.len() as u64,
            now.epoch_secs(),
            BlockPayload::changes(changes, now.to_human()),
            previous,
        ))
    }

    /// Append a block sealed from a candidate of `prepare_commit`.
    pub fn apply_sealed(&mut self, block: Block) -> Result<&Block> {
        let expected = self.blocks.len() as u64;
        let tip = self.latest()?.digest();
        if block.index() != expected || block.previous_digest() != tip {
            return Err(LedgerError::OutOfOrder {
                expected,
                got: block.index(),
            });
        }
        self.blocks.push(block);
        self.latest()
    }

    /// Put a candidate's changes back at the front of pending.
    pub fn requeue(&mut self, candidate: UnsealedBlock) {
        let mut changes = candidate.into_changes();
        changes.append(&mut self.pending);
        self.pending = changes;
    }

    /// Check every block after genesis, stopping at the first fault.
    pub fn verify(&self) -> Verification {
        for (i, pair) in self.blocks.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            let index = (i + 1) as u64;

            let kind = if current.compute_digest() != current.digest() {
                Some(FaultKind::HashMismatch)
            } else if current.previous_digest() != previous.digest() {
                Some(FaultKind::ChainBroken)
            } else if !meets_difficulty(current.digest(), self.difficulty) {
                Some(FaultKind::InvalidProofOfWork)
            } else {
                None
            };

            if let Some(kind) = kind {
                let fault = ChainFault { index, kind };
                warn!(index, fault = %fault, "chain verification failed");
                return Verification::Compromised(fault);
            }
        }
        Verification::Valid
    }

    /// Every record for `path`, oldest first.
    pub fn history_for(&self, path: impl AsRef<Path>) -> Vec<HistoryEntry> {
        let path = path.as_ref().to_string_lossy();
        let mut history = Vec::new();
        for block in &self.blocks {
            for change in block.changes() {
                if change.path == path {
                    history.push(HistoryEntry {
                        block_index: block.index(),
                        change: change.clone(),
                    });
                }
            }
        }
        history
    }

    /// Distinct recorded paths in first-seen order.
    pub fn tracked_paths(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.blocks
            .iter()
            .flat_map(|b| b.changes())
            .map(|c| c.path.as_str())
            .filter(|p| seen.insert(*p))
            .collect()
    }

    /// Compare a file's live content with its last recorded digest.
    pub fn detect_tampering(&self, path: impl AsRef<Path>) -> Result<TamperStatus> {
        let path = path.as_ref();
        let history = self.history_for(path);
        let Some(last) = history.last() else {
            return Ok(TamperStatus::NotTracked);
        };
        let recorded = &last.change.digest;

        let current = match self.hasher.digest_file(path) {
            Ok(digest) => digest,
            Err(e) if e.is_not_found() => {
                return Ok(if last.change.kind == ChangeKind::Delete {
                    TamperStatus::DeletedRecorded
                } else {
                    TamperStatus::FileMissing {
                        recorded: recorded.clone(),
                    }
                });
            }
            Err(e) => return Err(e),
        };

        if &current == recorded {
            Ok(TamperStatus::Verified)
        } else {
            Ok(TamperStatus::Tampered {
                recorded: recorded.clone(),
                current,
            })
        }
    }

    /// Overview with the last `recent` blocks.
    pub fn summary(&self, recent: usize) -> ChainSummary {
        let verification = self.verify();
        let skip = self.blocks.len().saturating_sub(recent);
        let recent_blocks = self.blocks[skip..]
            .iter()
            .map(|b| BlockSummary {
                index: b.index(),
                created_at: Timestamp::from_epoch_secs(b.created_at())
                    .map(|t| t.to_human())
                    .unwrap_or_else(|| "unknown".to_string()),
                changes: b.changes().len(),
                digest: b.digest().to_string(),
            })
            .collect();

        ChainSummary {
            total_blocks: self.blocks.len(),
            pending_changes: self.pending.len(),
            difficulty: self.difficulty,
            verification,
            reason: verification.reason(),
            recent_blocks,
        }
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("blocks", &self.blocks.len())
            .field("pending", &self.pending.len())
            .field("difficulty", &self.difficulty)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::digest;
    use crate::sealer::SealError;
    use ghost_test_utils::{assert_err, assert_ok, temp_dir};

    fn chain(difficulty: u32) -> Chain {
        Chain::builder().difficulty(difficulty).create().unwrap()
    }

    fn record(chain: &mut Chain, path: &str, kind: ChangeKind, d: &str) -> Option<Block> {
        chain
            .record_change(path, kind, Some(d.to_string()))
            .unwrap()
    }

    #[test]
    fn test_create_mints_sealed_genesis() {
        let chain = chain(2);
        assert_eq!(chain.len(), 1);
        let genesis = chain.latest().unwrap();
        assert!(genesis.is_genesis());
        assert_eq!(genesis.index(), 0);
        assert_eq!(genesis.previous_digest(), "0");
        assert!(genesis.digest().starts_with("00"));
        assert_eq!(genesis.compute_digest(), genesis.digest());
        assert!(chain.pending().is_empty());
        assert!(chain.verify().is_valid());
    }

    #[test]
    fn test_create_rejects_difficulty_above_max() {
        let result = Chain::builder().difficulty(MAX_DIFFICULTY + 1).create();
        assert!(matches!(result, Err(LedgerError::InvalidDifficulty(65))));
    }

    #[test]
    fn test_config_and_chain_share_difficulty_limit() {
        let mut config = ghost_common_config::GhostConfig::default();
        config.ledger.difficulty = MAX_DIFFICULTY + 1;
        let loader = ghost_common_config::ConfigLoader::default();
        assert!(loader.validate(&config).is_err());

        let result = ChainBuilder::from_config(&config.ledger).create();
        assert!(matches!(result, Err(LedgerError::InvalidDifficulty(d)) if d == MAX_DIFFICULTY + 1));
    }

    #[test]
    fn test_auto_commit_at_batch_size() {
        let mut chain = Chain::builder().difficulty(1).batch_size(3).create().unwrap();
        assert!(record(&mut chain, "a", ChangeKind::Create, "01").is_none());
        assert!(record(&mut chain, "b", ChangeKind::Create, "02").is_none());
        assert_eq!(chain.pending().len(), 2);

        let block = record(&mut chain, "c", ChangeKind::Create, "03").unwrap();
        assert_eq!(block.index(), 1);
        assert_eq!(block.changes().len(), 3);
        assert!(chain.pending().is_empty());
        assert_eq!(chain.len(), 2);

        match block.payload() {
            BlockPayload::Changes(batch) => assert_eq!(batch.count, 3),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_commit_empty_is_noop() {
        let mut chain = chain(1);
        assert!(chain.commit_pending().unwrap().is_none());
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_commit_links_to_tip() {
        let mut chain = chain(1);
        record(&mut chain, "a", ChangeKind::Create, "01");
        let first = chain.commit_pending().unwrap().unwrap();
        record(&mut chain, "a", ChangeKind::Modify, "02");
        let second = chain.commit_pending().unwrap().unwrap();

        assert_eq!(first.previous_digest(), chain.blocks()[0].digest());
        assert_eq!(second.previous_digest(), first.digest());
        assert_eq!(second.index(), 2);
        assert!(chain.verify().is_valid());
    }

    #[test]
    fn test_delete_forces_sentinel() {
        let mut chain = chain(0);
        record(&mut chain, "gone.txt", ChangeKind::Delete, "abcd");
        assert_eq!(chain.pending()[0].digest, DELETED);
    }

    #[test]
    fn test_deleted_override_on_non_delete_rejected() {
        let mut chain = chain(0);
        let err = chain
            .record_change("a", ChangeKind::Modify, Some(DELETED.to_string()))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidChange { .. }));
        assert!(chain.pending().is_empty());
    }

    #[test]
    fn test_unreadable_file_propagates_and_keeps_pending() {
        let dir = temp_dir();
        let mut chain = chain(0);
        record(&mut chain, "a", ChangeKind::Create, "01");

        let err = chain
            .record_change(dir.path().join("missing"), ChangeKind::Create, None)
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(chain.pending().len(), 1);

        let block = assert_ok!(chain.commit_pending()).unwrap();
        assert_eq!(block.changes().len(), 1);
    }

    #[test]
    fn test_record_hashes_file_content() {
        let dir = temp_dir();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "hello").unwrap();

        let mut chain = chain(0);
        chain.record_change(&path, ChangeKind::Create, None).unwrap();
        assert_eq!(chain.pending()[0].digest, digest(b"hello"));
        assert_eq!(chain.pending()[0].path, path.to_string_lossy());
    }

    #[test]
    fn test_verify_detects_payload_tamper() {
        let mut chain = chain(1);
        record(&mut chain, "a", ChangeKind::Create, "01");
        chain.commit_pending().unwrap();
        record(&mut chain, "b", ChangeKind::Create, "02");
        chain.commit_pending().unwrap();

        if let BlockPayload::Changes(batch) = &mut chain.blocks[1].payload {
            batch.changes[0].digest = "ff".to_string();
        }
        let fault = chain.verify().fault().unwrap();
        assert_eq!(fault, ChainFault { index: 1, kind: FaultKind::HashMismatch });
        assert_eq!(chain.verify().reason(), "Block 1 hash mismatch - tampered");
    }

    #[test]
    fn test_verify_detects_nonce_tamper() {
        let mut chain = chain(1);
        record(&mut chain, "a", ChangeKind::Create, "01");
        chain.commit_pending().unwrap();
        chain.blocks[1].nonce += 1;
        assert_eq!(
            chain.verify().fault().map(|f| f.kind),
            Some(FaultKind::HashMismatch)
        );
    }

    #[test]
    fn test_verify_reports_chain_broken_for_consistent_relink() {
        let mut chain = chain(0);
        record(&mut chain, "a", ChangeKind::Create, "01");
        chain.commit_pending().unwrap();

        let block = &mut chain.blocks[1];
        block.previous_digest = "f".repeat(64);
        block.digest = block.compute_digest();

        assert_eq!(
            chain.verify(),
            Verification::Compromised(ChainFault { index: 1, kind: FaultKind::ChainBroken })
        );
    }

    #[test]
    fn test_verify_reports_invalid_proof_of_work() {
        let mut chain = chain(0);
        record(&mut chain, "a", ChangeKind::Create, "01");
        chain.commit_pending().unwrap();

        // Find a nonce whose digest does not start with zero.
        let block = &mut chain.blocks[1];
        let mut nonce = 0;
        loop {
            block.nonce = nonce;
            block.digest = block.compute_digest();
            if !block.digest.starts_with('0') {
                break;
            }
            nonce += 1;
        }
        chain.difficulty = 1;

        assert_eq!(
            chain.verify().fault().map(|f| f.kind),
            Some(FaultKind::InvalidProofOfWork)
        );
    }

    #[test]
    fn test_verify_skips_genesis() {
        let mut chain = chain(0);
        chain.blocks[0].digest = "not a digest".to_string();
        assert!(chain.verify().is_valid());
    }

    #[test]
    fn test_history_in_chain_order() {
        let mut chain = Chain::builder().difficulty(0).batch_size(2).create().unwrap();
        record(&mut chain, "doc", ChangeKind::Create, "01");
        record(&mut chain, "other", ChangeKind::Create, "02");
        record(&mut chain, "doc", ChangeKind::Modify, "03");
        record(&mut chain, "doc", ChangeKind::Delete, "");

        let history = chain.history_for("doc");
        let kinds: Vec<_> = history.iter().map(|h| h.change.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Create, ChangeKind::Modify, ChangeKind::Delete]);
        let blocks: Vec<_> = history.iter().map(|h| h.block_index).collect();
        assert_eq!(blocks, vec![1, 2, 2]);

        assert_eq!(chain.tracked_paths(), vec!["doc", "other"]);
    }

    #[test]
    fn test_history_ignores_pending() {
        let mut chain = chain(0);
        record(&mut chain, "doc", ChangeKind::Create, "01");
        assert!(chain.history_for("doc").is_empty());
    }

    #[test]
    fn test_detect_tampering_states() {
        let dir = temp_dir();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "v1").unwrap();

        let mut chain = chain(0);
        assert_eq!(chain.detect_tampering(&path).unwrap(), TamperStatus::NotTracked);

        chain.record_change(&path, ChangeKind::Create, None).unwrap();
        chain.commit_pending().unwrap();
        assert_eq!(chain.detect_tampering(&path).unwrap(), TamperStatus::Verified);

        std::fs::write(&path, "v2").unwrap();
        let status = chain.detect_tampering(&path).unwrap();
        assert!(status.is_tampered());
        assert_eq!(
            status,
            TamperStatus::Tampered {
                recorded: digest(b"v1"),
                current: digest(b"v2"),
            }
        );

        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            chain.detect_tampering(&path).unwrap(),
            TamperStatus::FileMissing { recorded: digest(b"v1") }
        );

        chain.record_change(&path, ChangeKind::Delete, None).unwrap();
        chain.commit_pending().unwrap();
        assert_eq!(chain.detect_tampering(&path).unwrap(), TamperStatus::DeletedRecorded);

        std::fs::write(&path, "back").unwrap();
        assert!(chain.detect_tampering(&path).unwrap().is_tampered());
    }

    #[test]
    fn test_seal_timeout_requeues_and_leaves_chain() {
        let mut chain = chain(0);
        chain.difficulty = 6;
        chain.sealer = Arc::new(NonceSearch::with_max_attempts(1));

        record(&mut chain, "a", ChangeKind::Create, "01");
        record(&mut chain, "b", ChangeKind::Create, "02");
        let err = assert_err!(chain.commit_pending());
        assert!(err.is_retryable());
        assert!(matches!(err, LedgerError::Seal(SealError::Timeout { index: 1, .. })));

        assert_eq!(chain.len(), 1);
        let paths: Vec<_> = chain.pending().iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "b"]);
    }

    #[test]
    fn test_prepare_apply_requeue_cycle() {
        let mut chain = chain(0);
        record(&mut chain, "a", ChangeKind::Create, "01");
        let candidate = chain.prepare_commit().unwrap();
        assert!(chain.pending().is_empty());

        record(&mut chain, "b", ChangeKind::Create, "02");
        chain.requeue(candidate);
        let paths: Vec<_> = chain.pending().iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "b"]);

        let candidate = chain.prepare_commit().unwrap();
        let block = chain.sealer().seal(&candidate, chain.difficulty()).unwrap();
        let applied = chain.apply_sealed(block).unwrap();
        assert_eq!(applied.index(), 1);
        assert_eq!(applied.changes().len(), 2);
        assert!(chain.verify().is_valid());
    }

    #[test]
    fn test_apply_rejects_stale_block() {
        let mut chain = chain(0);
        record(&mut chain, "a", ChangeKind::Create, "01");
        let stale = chain.prepare_commit().unwrap();
        let stale = chain.sealer().seal(&stale, 0).unwrap();
        chain.apply_sealed(stale.clone()).unwrap();

        let err = chain.apply_sealed(stale).unwrap_err();
        assert!(matches!(err, LedgerError::OutOfOrder { expected: 2, got: 1 }));
    }

    #[test]
    fn test_summary() {
        let mut chain = Chain::builder().difficulty(0).batch_size(1).create().unwrap();
        for i in 0..6 {
            record(&mut chain, &format!("f{i}"), ChangeKind::Create, "01");
        }
        let mut pending = Chain::builder().difficulty(0).create().unwrap();
        record(&mut pending, "p", ChangeKind::Create, "01");

        let summary = chain.summary(SUMMARY_RECENT_BLOCKS);
        assert_eq!(summary.total_blocks, 7);
        assert_eq!(summary.pending_changes, 0);
        assert_eq!(summary.recent_blocks.len(), 5);
        assert_eq!(summary.recent_blocks[0].index, 2);
        assert_eq!(summary.recent_blocks[4].changes, 1);
        assert!(summary.verification.is_valid());

        assert_eq!(pending.summary(5).pending_changes, 1);
        assert_eq!(pending.summary(5).recent_blocks.len(), 1);
    }

    #[test]
    fn test_from_config() {
        let config = LedgerConfig {
            difficulty: 1,
            batch_size: 4,
            max_seal_attempts: Some(1_000_000),
            ..LedgerConfig::default()
        };
        let chain = ChainBuilder::from_config(&config).create().unwrap();
        assert_eq!(chain.difficulty(), 1);
        assert_eq!(chain.batch_size(), 4);
    }

    #[test]
    fn test_restore_rejects_empty() {
        let result = Chain::builder().restore(2, Vec::new());
        assert!(matches!(result, Err(LedgerError::EmptyChain)));
    }
}
