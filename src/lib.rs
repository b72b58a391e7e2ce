//! # zsl-rs
//!
//! Deterministic ordered sets of integers whose balance comes from the
//! Zeckendorf decomposition of each key's rank instead of rotations or random
//! levels.
//!
//! Two independent engines share one contract ([`OrderedIndex`]):
//!
//! - [`StaticZsl`]: sorted keys plus a Fibonacci skip-pointer table that is
//!   rebuilt on every mutation. Fast reads, O(n) writes.
//! - [`BlockedZsl`]: sorted blocks of roughly `B` keys behind a head index.
//!   O(log(N/B) + log B) reads, O(N/B + B) writes.
//!
//! Neither engine synchronizes internally; wrap one in a lock to share it.
//!
//! ## Example
//!
//! ```rust
//! use zsl_rs::{BlockedZsl, StaticZsl};
//!
//! let mut s = StaticZsl::from_keys([5, 3, 1, 4, 2]);
//! s.insert(9);
//! assert!(s.contains(4));
//! assert_eq!(s.range(3, 7).collect::<Vec<_>>(), vec![3, 4, 5]);
//!
//! let mut b = BlockedZsl::from_keys(1..=9, 3).unwrap();
//! assert!(b.remove(5));
//! assert_eq!(b.range(3, 7), vec![3, 4, 6]);
//! ```

#![forbid(unsafe_code)]

pub mod blocked;
pub mod config;
pub mod error;
pub mod fib;
pub mod static_zsl;

pub use blocked::{BlockState, BlockedZsl};
pub use config::{BlockedConfig, DEFAULT_BLOCK_SIZE};
pub use error::{Error, Result};
pub use static_zsl::StaticZsl;

/// Key type stored by both engines.
pub type Key = i64;

/// Operations shared by every engine.
///
/// The engines implement this independently; there is no common base.
pub trait OrderedIndex {
    /// Membership test.
    fn contains(&self, key: Key) -> bool;

    /// Insert `key`; a no-op when it is already present.
    fn insert(&mut self, key: Key);

    /// Remove `key`, returning whether it was present.
    fn remove(&mut self, key: Key) -> bool;

    /// Call `f` for each key in `[lo, hi)` in ascending order.
    fn range_for_each<F: FnMut(Key)>(&self, lo: Key, hi: Key, f: F);

    /// Snapshot of all keys in ascending order.
    fn keys(&self) -> Vec<Key>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod proptests;
