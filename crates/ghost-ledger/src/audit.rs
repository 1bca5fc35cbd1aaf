//! Read-only audit over a chain: every tracked file with its live status.

use crate::block::{ChangeKind, ChangeRecord};
use crate::chain::{Chain, TamperStatus, Verification};
use serde::Serialize;
use std::collections::HashMap;

/// Live status of one tracked file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LiveStatus {
    Verified,
    Tampered { current: String },
    DeletedRecorded,
    /// The file is absent although its last record was not a delete.
    MissingUnexpectedly,
    /// The file exists but could not be read.
    Unreadable { reason: String },
}

impl LiveStatus {
    /// Whether this status should be flagged to an operator.
    pub fn is_alert(&self) -> bool {
        !matches!(self, Self::Verified | Self::DeletedRecorded)
    }
}

/// Audit line for one path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedFile {
    pub path: String,
    /// Number of recorded changes.
    pub changes: usize,
    pub last_block: u64,
    pub last_kind: ChangeKind,
    pub last_digest: String,
    /// Human timestamp of the last change.
    pub last_recorded: String,
    pub status: LiveStatus,
}

/// Full audit of a chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub verification: Verification,
    pub total_blocks: usize,
    pub files: Vec<TrackedFile>,
}

impl AuditReport {
    pub fn alerts(&self) -> impl Iterator<Item = &TrackedFile> {
        self.files.iter().filter(|f| f.status.is_alert())
    }

    /// Whether the chain verified and no file needs attention.
    pub fn is_clean(&self) -> bool {
        self.verification.is_valid() && self.alerts().next().is_none()
    }
}

/// Audit every tracked path in first-seen order.
pub fn audit(chain: &Chain) -> AuditReport {
    let mut order: Vec<&str> = Vec::new();
    let mut latest: HashMap<&str, (usize, u64, &ChangeRecord)> = HashMap::new();

    for block in chain.blocks() {
        for change in block.changes() {
            let entry = latest
                .entry(change.path.as_str())
                .or_insert_with(|| {
                    order.push(change.path.as_str());
                    (0, block.index(), change)
                });
            entry.0 += 1;
            entry.1 = block.index();
            entry.2 = change;
        }
    }

    let files = order
        .into_iter()
        .filter_map(|path| latest.get(path).map(|entry| (path, *entry)))
        .map(|(path, (changes, last_block, last))| TrackedFile {
            path: path.to_string(),
            changes,
            last_block,
            last_kind: last.kind,
            last_digest: last.digest.clone(),
            last_recorded: last.timestamp_human.clone(),
            status: live_status(chain, path),
        })
        .collect();

    AuditReport {
        verification: chain.verify(),
        total_blocks: chain.len(),
        files,
    }
}

fn live_status(chain: &Chain, path: &str) -> LiveStatus {
    match chain.detect_tampering(path) {
        Ok(TamperStatus::Verified) => LiveStatus::Verified,
        Ok(TamperStatus::Tampered { current, .. }) => LiveStatus::Tampered { current },
        Ok(TamperStatus::DeletedRecorded) => LiveStatus::DeletedRecorded,
        Ok(TamperStatus::FileMissing { .. }) => LiveStatus::MissingUnexpectedly,
        // Unreachable for a path taken from the chain itself.
        Ok(TamperStatus::NotTracked) => LiveStatus::MissingUnexpectedly,
        Err(e) => LiveStatus::Unreadable {
            reason: e.to_string(),
        },
    }
}
