//! Static Zeckendorf skip list.
//!
//! Keys live in one sorted `Vec`; a flat pointer table indexed by rank and
//! level provides the skip structure. The table is derived data: every
//! structural mutation throws it away and rebuilds it from the keys.

use crate::fib::{self, FibOffsets};
use crate::{Key, OrderedIndex};

/// Sentinel for "no hop at this level". Rank 0 is the head and is never a
/// hop target, so it doubles as the null pointer.
const NONE: usize = 0;

// =============================================================================
// StaticZsl
// =============================================================================

/// An ordered set of integers with deterministic Fibonacci skip pointers.
///
/// Reads walk the pointer table in O(log n); writes rebuild it in O(n).
#[derive(Clone)]
pub struct StaticZsl {
    /// Ascending, deduplicated. Rank `r` is `keys[r - 1]`.
    keys: Vec<Key>,
    fibs: FibOffsets,
    /// Number of skip levels (offsets `<= keys.len()`).
    levels: usize,
    /// `(n + 1) × levels` hop targets; `next[rank * levels + (level - 1)]`.
    next: Vec<usize>,
}

impl StaticZsl {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            fibs: FibOffsets::new(),
            levels: 0,
            next: Vec::new(),
        }
    }

    /// Build from any collection of keys; input is sorted and deduplicated.
    pub fn from_keys<I: IntoIterator<Item = Key>>(keys: I) -> Self {
        let mut keys: Vec<Key> = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();

        let mut zsl = Self {
            keys,
            ..Self::new()
        };
        zsl.rebuild();
        zsl
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of skip levels currently in the table.
    #[inline]
    pub fn level_count(&self) -> usize {
        self.levels
    }

    pub fn contains(&self, key: Key) -> bool {
        match self.floor_rank(key) {
            NONE => false,
            rank => self.keys[rank - 1] == key,
        }
    }

    /// Insert `key`; a present key leaves the set untouched.
    pub fn insert(&mut self, key: Key) {
        let Err(pos) = self.keys.binary_search(&key) else {
            return;
        };
        self.keys.insert(pos, key);
        self.rebuild();
    }

    /// Remove `key`, returning whether it was present.
    pub fn remove(&mut self, key: Key) -> bool {
        let Ok(pos) = self.keys.binary_search(&key) else {
            return false;
        };
        self.keys.remove(pos);
        self.rebuild();
        true
    }

    /// Call `f` for each key in `[lo, hi)`, ascending, without allocating.
    pub fn range_for_each<F: FnMut(Key)>(&self, lo: Key, hi: Key, mut f: F) {
        for key in self.range(lo, hi) {
            f(key);
        }
    }

    /// Lazy ascending iterator over keys in `[lo, hi)`.
    pub fn range(&self, lo: Key, hi: Key) -> Range<'_> {
        if lo >= hi {
            return Range {
                inner: self.keys[..0].iter(),
            };
        }
        let start = self.keys.partition_point(|&k| k < lo);
        let end = self.keys.partition_point(|&k| k < hi);
        Range {
            inner: self.keys[start..end].iter(),
        }
    }

    pub fn iter(&self) -> Range<'_> {
        Range {
            inner: self.keys.iter(),
        }
    }

    /// Snapshot of all keys in ascending order.
    pub fn keys(&self) -> Vec<Key> {
        self.keys.clone()
    }

    /// Borrow the keys without copying.
    #[inline]
    pub fn as_slice(&self) -> &[Key] {
        &self.keys
    }

    // =========================================================================
    // Pointer table
    // =========================================================================

    #[inline]
    fn hop(&self, rank: usize, level: usize) -> usize {
        self.next[rank * self.levels + level]
    }

    /// Rank of the largest key `<= key`, or 0 (the head) if there is none.
    ///
    /// Descends from the top level, advancing while the next key fits. The
    /// hops taken are exactly the Zeckendorf terms of the returned rank, so a
    /// level is never revisited.
    fn floor_rank(&self, key: Key) -> usize {
        let mut rank = NONE;
        for level in (0..self.levels).rev() {
            loop {
                let next = self.hop(rank, level);
                if next == NONE || self.keys[next - 1] > key {
                    break;
                }
                rank = next;
            }
        }
        rank
    }

    /// Recompute every pointer from the current keys.
    ///
    /// Each rank `r` is reached by a single hop: its smallest Zeckendorf term
    /// `F[i]` links `r - F[i]` to `r` at level `i + 1`. The source rank's own
    /// decomposition is the remaining larger terms, so walking hops from the
    /// head spells out the decomposition of the destination. The head gets an
    /// entry hop to `F[i]` on every level.
    fn rebuild(&mut self) {
        let n = self.keys.len();
        self.fibs.ensure(n);
        self.levels = self.fibs.level_count(n);

        self.next.clear();
        self.next.resize((n + 1) * self.levels, NONE);

        let offsets = self.fibs.as_slice();
        for rank in 1..=n {
            if let Some(level) = fib::smallest_term(rank, offsets) {
                let from = rank - offsets[level];
                self.next[from * self.levels + level] = rank;
            }
        }

        tracing::trace!(keys = n, levels = self.levels, "rebuilt zeckendorf pointer table");
    }
}

impl Default for StaticZsl {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Key> for StaticZsl {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self::from_keys(iter)
    }
}

impl Extend<Key> for StaticZsl {
    /// Bulk insert with a single rebuild.
    fn extend<I: IntoIterator<Item = Key>>(&mut self, iter: I) {
        let before = self.keys.len();
        self.keys.extend(iter);
        if self.keys.len() == before {
            return;
        }
        self.keys.sort_unstable();
        self.keys.dedup();
        self.rebuild();
    }
}

impl std::fmt::Debug for StaticZsl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl OrderedIndex for StaticZsl {
    fn contains(&self, key: Key) -> bool {
        StaticZsl::contains(self, key)
    }

    fn insert(&mut self, key: Key) {
        StaticZsl::insert(self, key)
    }

    fn remove(&mut self, key: Key) -> bool {
        StaticZsl::remove(self, key)
    }

    fn range_for_each<F: FnMut(Key)>(&self, lo: Key, hi: Key, f: F) {
        StaticZsl::range_for_each(self, lo, hi, f)
    }

    fn keys(&self) -> Vec<Key> {
        StaticZsl::keys(self)
    }

    fn len(&self) -> usize {
        StaticZsl::len(self)
    }
}

// =============================================================================
// Range iterator
// =============================================================================

/// Ascending keys of a [`StaticZsl`] within a half-open interval.
#[derive(Clone, Debug)]
pub struct Range<'a> {
    inner: std::slice::Iter<'a, Key>,
}

impl<'a> Iterator for Range<'a> {
    type Item = Key;

    #[inline]
    fn next(&mut self) -> Option<Key> {
        self.inner.next().copied()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> DoubleEndedIterator for Range<'a> {
    #[inline]
    fn next_back(&mut self) -> Option<Key> {
        self.inner.next_back().copied()
    }
}

impl<'a> ExactSizeIterator for Range<'a> {}

impl<'a> std::iter::FusedIterator for Range<'a> {}
