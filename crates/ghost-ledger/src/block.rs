//! Blocks, payloads and change records.

use crate::canonical;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

pub use ghost_common_config::MAX_DIFFICULTY;

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS: &str = "0";

/// Message carried by every genesis payload.
pub const GENESIS_MESSAGE: &str = "Project GHOST - Integrity Blockchain Initialized";

/// Kind of file-system change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Modify,
    Delete,
}

impl ChangeKind {
    /// Persisted name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" | "created" => Ok(Self::Create),
            "modify" | "modified" => Ok(Self::Modify),
            "delete" | "deleted" => Ok(Self::Delete),
            other => Err(format!("unknown change kind: {other}")),
        }
    }
}

/// One observed change to one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeRecord {
    /// Path as reported by the watcher.
    #[serde(rename = "filepath")]
    pub path: String,
    /// Content digest, or `"deleted"`.
    #[serde(rename = "hash")]
    pub digest: String,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// Epoch seconds when the change was recorded.
    pub timestamp: f64,
    pub timestamp_human: String,
}

impl ChangeRecord {
    fn canonical_value(&self) -> Value {
        json!({
            "filepath": self.path,
            "hash": self.digest,
            "type": self.kind.as_str(),
            "timestamp": self.timestamp,
            "timestamp_human": self.timestamp_human,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum GenesisTag {
    Genesis,
}

/// Payload of block 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenesisPayload {
    #[serde(rename = "type")]
    tag: GenesisTag,
    pub message: String,
    pub timestamp_human: String,
}

/// Payload of every block after genesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeBatch {
    pub changes: Vec<ChangeRecord>,
    pub count: u64,
    pub committed_at: String,
}

/// Block payload. The two shapes are distinguished by their fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockPayload {
    Genesis(GenesisPayload),
    Changes(ChangeBatch),
}

impl BlockPayload {
    /// Genesis payload stamped with `timestamp_human`.
    pub fn genesis(timestamp_human: impl Into<String>) -> Self {
        Self::Genesis(GenesisPayload {
            tag: GenesisTag::Genesis,
            message: GENESIS_MESSAGE.to_string(),
            timestamp_human: timestamp_human.into(),
        })
    }

    /// Change batch payload; `count` is taken from `changes`.
    pub fn changes(changes: Vec<ChangeRecord>, committed_at: impl Into<String>) -> Self {
        Self::Changes(ChangeBatch {
            count: changes.len() as u64,
            changes,
            committed_at: committed_at.into(),
        })
    }

    /// Changes carried by this payload. Empty for genesis.
    pub fn records(&self) -> &[ChangeRecord] {
        match self {
            Self::Genesis(_) => &[],
            Self::Changes(batch) => &batch.changes,
        }
    }

    /// JSON value hashed into the block digest.
    pub fn canonical_value(&self) -> Value {
        match self {
            Self::Genesis(g) => json!({
                "type": "genesis",
                "message": g.message,
                "timestamp_human": g.timestamp_human,
            }),
            Self::Changes(batch) => json!({
                "changes": batch.changes.iter().map(ChangeRecord::canonical_value).collect::<Vec<_>>(),
                "count": batch.count,
                "committed_at": batch.committed_at,
            }),
        }
    }
}

/// Precomputed digest input for one candidate block.
///
/// Canonical key order puts `nonce` between `index` and `previous_hash`,
/// so everything before it is absorbed into a hasher state once and only
/// the nonce and the fixed suffix are hashed per attempt.
#[derive(Clone)]
pub struct DigestTemplate {
    prefix: Sha256,
    suffix: Vec<u8>,
}

impl DigestTemplate {
    fn new(index: u64, created_at: f64, payload: &BlockPayload, previous_digest: &str) -> Self {
        let mut head = String::from("{\"data\": ");
        canonical::write_value(&mut head, &payload.canonical_value());
        head.push_str(&format!(", \"index\": {index}, \"nonce\": "));

        let mut tail = String::from(", \"previous_hash\": ");
        canonical::write_value(&mut tail, &Value::String(previous_digest.to_string()));
        tail.push_str(", \"timestamp\": ");
        canonical::write_value(&mut tail, &json!(created_at));
        tail.push('}');

        let mut prefix = Sha256::new();
        prefix.update(head.as_bytes());
        Self {
            prefix,
            suffix: tail.into_bytes(),
        }
    }

    /// Raw digest for `nonce`.
    pub fn digest_bytes(&self, nonce: u64) -> [u8; 32] {
        let mut hasher = self.prefix.clone();
        hasher.update(nonce.to_string().as_bytes());
        hasher.update(&self.suffix);
        hasher.finalize().into()
    }

    /// Lowercase hex digest for `nonce`.
    pub fn digest_hex(&self, nonce: u64) -> String {
        to_hex(&self.digest_bytes(nonce))
    }
}

impl fmt::Debug for DigestTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestTemplate")
            .field("suffix_len", &self.suffix.len())
            .finish()
    }
}

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Whether a hex digest starts with `difficulty` zeros.
pub fn meets_difficulty(digest: &str, difficulty: u32) -> bool {
    let d = difficulty as usize;
    digest.len() >= d && digest.bytes().take(d).all(|b| b == b'0')
}

/// Whether raw digest bytes start with `difficulty` zero nibbles.
pub fn leading_zero_nibbles(bytes: &[u8], difficulty: u32) -> bool {
    let d = difficulty as usize;
    if bytes.len() * 2 < d {
        return false;
    }
    let full = d / 2;
    bytes[..full].iter().all(|b| *b == 0) && (d % 2 == 0 || bytes[full] >> 4 == 0)
}

/// A block whose fields are fixed but which has no nonce yet.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsealedBlock {
    pub index: u64,
    pub created_at: f64,
    pub payload: BlockPayload,
    pub previous_digest: String,
}

impl UnsealedBlock {
    pub fn new(
        index: u64,
        created_at: f64,
        payload: BlockPayload,
        previous_digest: impl Into<String>,
    ) -> Self {
        Self {
            index,
            created_at,
            payload,
            previous_digest: previous_digest.into(),
        }
    }

    /// Digest input with the nonce left open.
    pub fn digest_template(&self) -> DigestTemplate {
        DigestTemplate::new(self.index, self.created_at, &self.payload, &self.previous_digest)
    }

    /// Fix `nonce` and compute the resulting digest.
    pub fn into_sealed(self, nonce: u64) -> Block {
        let digest = self.digest_template().digest_hex(nonce);
        self.into_sealed_with_digest(nonce, digest)
    }

    pub(crate) fn into_sealed_with_digest(self, nonce: u64, digest: String) -> Block {
        Block {
            index: self.index,
            created_at: self.created_at,
            payload: self.payload,
            previous_digest: self.previous_digest,
            nonce,
            digest,
        }
    }

    /// Changes that would go into this block.
    pub fn into_changes(self) -> Vec<ChangeRecord> {
        match self.payload {
            BlockPayload::Genesis(_) => Vec::new(),
            BlockPayload::Changes(batch) => batch.changes,
        }
    }
}

/// A sealed block. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub(crate) index: u64,
    #[serde(rename = "timestamp")]
    pub(crate) created_at: f64,
    #[serde(rename = "data")]
    pub(crate) payload: BlockPayload,
    #[serde(rename = "previous_hash")]
    pub(crate) previous_digest: String,
    pub(crate) nonce: u64,
    #[serde(rename = "hash")]
    pub(crate) digest: String,
}

impl Block {
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Epoch seconds at which the block was assembled.
    pub fn created_at(&self) -> f64 {
        self.created_at
    }

    pub fn payload(&self) -> &BlockPayload {
        &self.payload
    }

    pub fn previous_digest(&self) -> &str {
        &self.previous_digest
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Stored digest.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Changes in this block. Empty for genesis.
    pub fn changes(&self) -> &[ChangeRecord] {
        self.payload.records()
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self.payload, BlockPayload::Genesis(_))
    }

    /// Digest recomputed from the current field values.
    pub fn compute_digest(&self) -> String {
        DigestTemplate::new(self.index, self.created_at, &self.payload, &self.previous_digest)
            .digest_hex(self.nonce)
    }
}
