//! Error types for zsl-rs.

use thiserror::Error;

/// Errors raised when an index is configured outside its contract.
///
/// Lookups and mutations never fail; only construction can.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The blocked index needs at least one key per block.
    #[error("invalid block size {block_size}: must be at least 1")]
    InvalidBlockSize {
        /// The rejected block size.
        block_size: usize,
    },
}

/// Result type for zsl-rs operations.
pub type Result<T> = std::result::Result<T, Error>;
