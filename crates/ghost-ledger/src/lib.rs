//! Tamper-evident ledger of file changes.
//!
//! Changes are buffered and sealed into blocks. Each block carries the
//! digest of its predecessor and a proof-of-work nonce, so editing any
//! sealed block after the fact shows up in [`Chain::verify`].

pub mod audit;
pub mod block;
pub mod canonical;
pub mod chain;
pub mod codec;
pub mod error;
pub mod hasher;
pub mod sealer;
pub mod shared;

pub use audit::{audit, AuditReport, LiveStatus, TrackedFile};
pub use block::{
    Block, BlockPayload, ChangeBatch, ChangeKind, ChangeRecord, GenesisPayload, UnsealedBlock,
    MAX_DIFFICULTY,
};
pub use chain::{
    BlockSummary, Chain, ChainBuilder, ChainFault, ChainSummary, FaultKind, HistoryEntry,
    TamperStatus, Verification,
};
pub use error::{LedgerError, Result};
pub use hasher::{ContentHasher, Sha256FileHasher, DELETED};
pub use sealer::{NonceSearch, SealError, Sealer};
pub use shared::SharedChain;
