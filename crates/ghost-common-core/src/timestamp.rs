//! Timestamp utilities.
//!
//! Ledger records carry two renderings of the same instant: fractional
//! seconds since the Unix epoch (machine comparable) and a local
//! `YYYY-MM-DD HH:MM:SS` string for people reading the chain file.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format used for human-readable renderings.
pub const HUMAN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A wall-clock instant.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// From fractional epoch seconds. `None` if out of range or not finite.
    pub fn from_epoch_secs(secs: f64) -> Option<Self> {
        if !secs.is_finite() {
            return None;
        }
        let whole = secs.floor();
        let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
        Utc.timestamp_opt(whole as i64, nanos).single().map(Self)
    }

    /// Fractional seconds since the Unix epoch, microsecond resolution.
    pub fn epoch_secs(&self) -> f64 {
        self.0.timestamp() as f64 + f64::from(self.0.timestamp_subsec_micros()) / 1_000_000.0
    }

    /// Local `YYYY-MM-DD HH:MM:SS` rendering.
    pub fn to_human(&self) -> String {
        self.0.with_timezone(&Local).format(HUMAN_FORMAT).to_string()
    }

    /// ISO 8601 string.
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_human())
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.to_iso8601())
    }
}
