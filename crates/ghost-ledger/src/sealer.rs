//! Proof-of-work sealing.

use crate::block::{leading_zero_nibbles, to_hex, Block, UnsealedBlock, MAX_DIFFICULTY};
use thiserror::Error;
use tracing::debug;

/// Sealing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SealError {
    /// The configured attempt budget ran out.
    #[error("no nonce for block {index} met difficulty {difficulty} within {attempts} attempts")]
    Timeout {
        index: u64,
        difficulty: u32,
        attempts: u64,
    },

    /// No digest can satisfy the difficulty.
    #[error("difficulty {difficulty} cannot be satisfied")]
    Unsatisfiable { difficulty: u32 },
}

impl SealError {
    /// Whether sealing the same candidate again can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Turns a candidate block into a sealed one.
pub trait Sealer: Send + Sync {
    fn seal(&self, candidate: &UnsealedBlock, difficulty: u32) -> Result<Block, SealError>;
}

/// Linear nonce search from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NonceSearch {
    max_attempts: Option<u64>,
}

impl NonceSearch {
    /// Unbounded search.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up after `attempts` nonces.
    pub fn with_max_attempts(attempts: u64) -> Self {
        Self {
            max_attempts: Some(attempts),
        }
    }

    pub fn max_attempts(&self) -> Option<u64> {
        self.max_attempts
    }
}

impl Sealer for NonceSearch {
    fn seal(&self, candidate: &UnsealedBlock, difficulty: u32) -> Result<Block, SealError> {
        if difficulty > MAX_DIFFICULTY {
            return Err(SealError::Unsatisfiable { difficulty });
        }

        let template = candidate.digest_template();
        let limit = self.max_attempts.unwrap_or(u64::MAX);
        let mut nonce: u64 = 0;

        while nonce < limit {
            let bytes = template.digest_bytes(nonce);
            if leading_zero_nibbles(&bytes, difficulty) {
                debug!(index = candidate.index, nonce, "nonce found");
                return Ok(candidate.clone().into_sealed_with_digest(nonce, to_hex(&bytes)));
            }
            nonce += 1;
        }

        Err(SealError::Timeout {
            index: candidate.index,
            difficulty,
            attempts: nonce,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{meets_difficulty, BlockPayload, GENESIS_PREVIOUS};

    fn candidate() -> UnsealedBlock {
        UnsealedBlock::new(
            0,
            1_700_000_000.5,
            BlockPayload::genesis("2023-11-14 22:13:20"),
            GENESIS_PREVIOUS,
        )
    }

    #[test]
    fn test_finds_first_valid_nonce() {
        let block = NonceSearch::new().seal(&candidate(), 2).unwrap();
        assert_eq!(block.nonce(), 729);
        assert!(meets_difficulty(block.digest(), 2));
        assert_eq!(block.compute_digest(), block.digest());
    }

    #[test]
    fn test_difficulty_zero_takes_first_nonce() {
        let block = NonceSearch::new().seal(&candidate(), 0).unwrap();
        assert_eq!(block.nonce(), 0);
    }

    #[test]
    fn test_attempt_cap_times_out() {
        let err = NonceSearch::with_max_attempts(100)
            .seal(&candidate(), 2)
            .unwrap_err();
        assert_eq!(
            err,
            SealError::Timeout {
                index: 0,
                difficulty: 2,
                attempts: 100
            }
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn test_cap_large_enough_succeeds() {
        let block = NonceSearch::with_max_attempts(730)
            .seal(&candidate(), 2)
            .unwrap();
        assert_eq!(block.nonce(), 729);
    }

    #[test]
    fn test_unsatisfiable_difficulty() {
        let err = NonceSearch::new().seal(&candidate(), 65).unwrap_err();
        assert_eq!(err, SealError::Unsatisfiable { difficulty: 65 });
        assert!(!err.is_retryable());
    }
}
