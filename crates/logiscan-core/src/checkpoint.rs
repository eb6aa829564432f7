//! Checkpoint model: the per-flavor resume position.
//!
//! A checkpoint records the block currently being (or last) processed. It is
//! upserted *before* a block's transactions are processed, so on restart the
//! records of that block may be partial and are rolled back by the resume
//! manager before the block is processed again.

use serde::{Deserialize, Serialize};

use crate::types::Flavor;

/// A persisted checkpoint for one scanner flavor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub flavor: Flavor,
    /// Block whose processing most recently started.
    pub block_number: u64,
    /// Unix timestamp of when this checkpoint was saved.
    pub updated_at: i64,
}

impl Checkpoint {
    /// A checkpoint at `block_number` stamped with the current time.
    pub fn now(flavor: Flavor, block_number: u64) -> Self {
        Self {
            flavor,
            block_number,
            updated_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Explicit scanner state threaded through the scan loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerState {
    pub flavor: Flavor,
    /// Last block whose processing started, `None` before the first block.
    pub last_block: Option<u64>,
}

impl ScannerState {
    pub fn new(flavor: Flavor) -> Self {
        Self {
            flavor,
            last_block: None,
        }
    }

    /// The next block number the scanner expects.
    pub fn next_block(&self, default: u64) -> u64 {
        self.last_block.map(|b| b + 1).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_block_defaults_until_first_block() {
        let mut state = ScannerState::new(Flavor::Token);
        assert_eq!(state.next_block(100), 100);
        state.last_block = Some(120);
        assert_eq!(state.next_block(100), 121);
    }
}
