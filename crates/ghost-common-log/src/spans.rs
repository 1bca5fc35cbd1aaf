//! Span helpers and operation timing.

use std::time::{Duration, Instant};
use tracing::{info_span, Span};

/// Span covering a ledger operation (commit, verify, save, load).
pub fn ledger_span(operation: &str) -> Span {
    info_span!("ledger", op = %operation)
}

/// Span covering the sealing of one block.
pub fn seal_span(index: u64, difficulty: u32) -> Span {
    info_span!("seal", index, difficulty)
}

/// Timing utility for operations.
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }

    /// Complete the timer, log and return the duration.
    pub fn finish(self) -> Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %duration.as_millis(),
            "operation completed"
        );
        duration
    }
}
