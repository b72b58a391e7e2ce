//! Configuration for the blocked index.

use crate::error::{Error, Result};

/// Block size used when none is given.
pub const DEFAULT_BLOCK_SIZE: usize = 256;

/// Tuning for [`BlockedZsl`](crate::BlockedZsl).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockedConfig {
    /// Target block size `B`. Blocks are kept within `[B/2, 2B]` keys.
    pub block_size: usize,
}

impl BlockedConfig {
    pub fn new(block_size: usize) -> Self {
        Self { block_size }
    }

    /// Rejects a degenerate block size before any block is built.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(Error::InvalidBlockSize {
                block_size: self.block_size,
            });
        }
        Ok(())
    }

    /// Blocks larger than this are split.
    #[inline]
    pub fn max_block_len(&self) -> usize {
        self.block_size.saturating_mul(2)
    }

    /// Blocks smaller than this are merged into a neighbour.
    #[inline]
    pub fn min_block_len(&self) -> usize {
        self.block_size / 2
    }
}

impl Default for BlockedConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}
