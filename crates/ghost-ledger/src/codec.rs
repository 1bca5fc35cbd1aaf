//! Chain file persistence.
//!
//! The file is pretty-printed JSON with two-space indentation:
//!
//! ```json
//! { "difficulty": 2, "blocks": [ ... ], "saved_at": "2024-01-01 12:00:00" }
//! ```

use crate::block::Block;
use crate::chain::{Chain, ChainBuilder, Verification, DEFAULT_DIFFICULTY};
use crate::error::{LedgerError, Result};
use ghost_common_core::Timestamp;
use ghost_common_log::spans::ledger_span;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Upper bound on chain files accepted by `load`.
pub const MAX_CHAIN_FILE_SIZE: u64 = 512 * 1024 * 1024;

#[derive(Serialize)]
struct ChainFileRef<'a> {
    difficulty: u32,
    blocks: &'a [Block],
    saved_at: String,
}

#[derive(Deserialize)]
struct ChainFile {
    #[serde(default = "default_difficulty")]
    difficulty: u32,
    blocks: Vec<Block>,
}

fn default_difficulty() -> u32 {
    DEFAULT_DIFFICULTY
}

/// Serialize a chain's sealed blocks. Pending changes are not persisted.
pub fn to_json(chain: &Chain) -> Result<String> {
    let file = ChainFileRef {
        difficulty: chain.difficulty(),
        blocks: chain.blocks(),
        saved_at: Timestamp::now().to_human(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Parse a chain file. Blocks are taken verbatim and not verified.
pub fn from_json(json: &str, builder: ChainBuilder) -> Result<Chain> {
    let file: ChainFile = serde_json::from_str(json)?;
    if file.blocks.is_empty() {
        return Err(LedgerError::Codec("block list is empty".to_string()));
    }
    builder.restore(file.difficulty, file.blocks)
}

/// Write the chain to `path`, replacing any previous file atomically.
pub fn save(chain: &Chain, path: &Path) -> Result<()> {
    let _span = ledger_span("save").entered();
    let json = to_json(chain)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ghost_common_fs::ensure_dir(parent)?;
    }
    ghost_common_fs::write_string_atomic(path, &json)?;
    info!(path = %path.display(), blocks = chain.len(), "chain saved");
    Ok(())
}

/// Read a chain from `path` without verifying it.
pub fn load(path: &Path, builder: ChainBuilder) -> Result<Chain> {
    let _span = ledger_span("load").entered();
    let json = ghost_common_fs::read_to_string(path, MAX_CHAIN_FILE_SIZE)?;
    let chain = from_json(&json, builder)?;
    info!(path = %path.display(), blocks = chain.len(), "chain loaded");
    Ok(chain)
}

/// Read a chain and fail with `Compromised` unless it verifies.
pub fn load_verified(path: &Path, builder: ChainBuilder) -> Result<Chain> {
    let chain = load(path, builder)?;
    match chain.verify() {
        Verification::Valid => Ok(chain),
        Verification::Compromised(fault) => Err(LedgerError::Compromised(fault)),
    }
}

/// Load `path` if it exists, otherwise mint a new chain.
pub fn load_or_create(path: &Path, builder: ChainBuilder) -> Result<Chain> {
    match load(path, builder.clone()) {
        Ok(chain) => Ok(chain),
        Err(e) if e.is_not_found() => {
            warn!(path = %path.display(), "no chain file, creating a new chain");
            builder.create()
        }
        Err(e) => Err(e),
    }
}
