//! Blocked Zeckendorf index.
//!
//! Keys are kept in sorted blocks of roughly `B` keys, with a parallel array
//! of block heads for the coarse binary search. Mutations touch one block (or
//! two, when a merge happens) instead of the whole key set.

use crate::config::BlockedConfig;
use crate::error::Result;
use crate::{Key, OrderedIndex};

// =============================================================================
// Block state
// =============================================================================

/// What a block needs after a mutation, judged from its size alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockState {
    /// Within bounds; only its head may need refreshing.
    Stable,
    /// More than `2B` keys.
    SplitPending,
    /// Fewer than `B/2` keys while other blocks exist, or empty.
    MergePending,
}

impl BlockState {
    pub fn classify(len: usize, config: &BlockedConfig, block_count: usize) -> Self {
        if len > config.max_block_len() {
            BlockState::SplitPending
        } else if len == 0 || (len < config.min_block_len() && block_count > 1) {
            BlockState::MergePending
        } else {
            BlockState::Stable
        }
    }
}

// =============================================================================
// BlockedZsl
// =============================================================================

/// An ordered set of integers stored as a sequence of sorted blocks.
///
/// Invariants:
/// - concatenating `blocks` yields every key, strictly ascending
/// - `heads[i] == blocks[i][0]`, and no block is empty
/// - every block holds `[B/2, 2B]` keys, except a sole block which may be smaller
#[derive(Clone)]
pub struct BlockedZsl {
    blocks: Vec<Vec<Key>>,
    heads: Vec<Key>,
    config: BlockedConfig,
}

impl BlockedZsl {
    /// An empty index with target block size `block_size`.
    pub fn new(block_size: usize) -> Result<Self> {
        Self::from_keys(std::iter::empty(), block_size)
    }

    /// Build from any collection of keys; input is sorted and deduplicated, then
    /// cut into blocks of `block_size`.
    pub fn from_keys<I: IntoIterator<Item = Key>>(keys: I, block_size: usize) -> Result<Self> {
        Self::with_config(keys, &BlockedConfig::new(block_size))
    }

    pub fn with_config<I: IntoIterator<Item = Key>>(
        keys: I,
        config: &BlockedConfig,
    ) -> Result<Self> {
        config.validate()?;

        let mut keys: Vec<Key> = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();

        let mut blocks: Vec<Vec<Key>> = keys
            .chunks(config.block_size)
            .map(|chunk| chunk.to_vec())
            .collect();
        // A short tail would start life below the merge threshold.
        if blocks.len() > 1
            && blocks
                .last()
                .is_some_and(|tail| tail.len() < config.min_block_len())
        {
            if let Some(tail) = blocks.pop() {
                if let Some(prev) = blocks.last_mut() {
                    prev.extend(tail);
                }
            }
        }
        let heads = blocks.iter().filter_map(|b| b.first().copied()).collect();

        tracing::debug!(
            keys = keys.len(),
            blocks = blocks.len(),
            block_size = config.block_size,
            "built blocked index"
        );

        Ok(Self {
            blocks,
            heads,
            config: *config,
        })
    }

    /// Number of keys. Walks the blocks: O(N/B).
    pub fn len(&self) -> usize {
        self.blocks.iter().map(Vec::len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.config.block_size
    }

    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Sizes of the blocks, in key order.
    pub fn block_lens(&self) -> Vec<usize> {
        self.blocks.iter().map(Vec::len).collect()
    }

    pub fn contains(&self, key: Key) -> bool {
        match self.locate(key) {
            Some(idx) => self.blocks[idx].binary_search(&key).is_ok(),
            None => false,
        }
    }

    /// Insert `key`; a present key leaves the index untouched.
    pub fn insert(&mut self, key: Key) {
        if self.blocks.is_empty() {
            self.blocks.push(vec![key]);
            self.heads.push(key);
            return;
        }

        // Keys below every head go to the front of the first block.
        let idx = self.locate(key).unwrap_or(0);
        let block = &mut self.blocks[idx];
        let Err(pos) = block.binary_search(&key) else {
            return;
        };
        block.insert(pos, key);
        self.settle(idx);
    }

    /// Remove `key`, returning whether it was present.
    pub fn remove(&mut self, key: Key) -> bool {
        let Some(idx) = self.locate(key) else {
            return false;
        };
        let block = &mut self.blocks[idx];
        let Ok(pos) = block.binary_search(&key) else {
            return false;
        };
        block.remove(pos);
        self.settle(idx);
        true
    }

    /// Materialize the keys in `[lo, hi)`.
    pub fn range(&self, lo: Key, hi: Key) -> Vec<Key> {
        self.range_iter(lo, hi).collect()
    }

    /// Call `f` for each key in `[lo, hi)`, ascending, without allocating.
    pub fn range_for_each<F: FnMut(Key)>(&self, lo: Key, hi: Key, mut f: F) {
        if lo >= hi {
            return;
        }
        let start = self.locate(lo).unwrap_or(0);
        for (i, block) in self.blocks.iter().enumerate().skip(start) {
            if self.heads[i] >= hi {
                break;
            }
            let from = if i == start {
                block.partition_point(|&k| k < lo)
            } else {
                0
            };
            for &key in block[from..].iter().take_while(|&&k| k < hi) {
                f(key);
            }
        }
    }

    /// Lazy ascending iterator over keys in `[lo, hi)`.
    pub fn range_iter(&self, lo: Key, hi: Key) -> Range<'_> {
        if lo >= hi || self.blocks.is_empty() {
            return Range::empty(self, hi);
        }
        let start = self.locate(lo).unwrap_or(0);
        let from = self.blocks[start].partition_point(|&k| k < lo);
        Range {
            zsl: self,
            block: start,
            pos: from,
            hi,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Key> + '_ {
        self.blocks.iter().flatten().copied()
    }

    /// Snapshot of all keys in ascending order.
    pub fn keys(&self) -> Vec<Key> {
        let mut out = Vec::with_capacity(self.len());
        for block in &self.blocks {
            out.extend_from_slice(block);
        }
        out
    }

    // =========================================================================
    // Block maintenance
    // =========================================================================

    /// Index of the last block whose head is `<= key`.
    #[inline]
    fn locate(&self, key: Key) -> Option<usize> {
        self.heads.partition_point(|&h| h <= key).checked_sub(1)
    }

    /// Restore the block invariants after block `idx` changed size.
    fn settle(&mut self, idx: usize) {
        match BlockState::classify(self.blocks[idx].len(), &self.config, self.blocks.len()) {
            BlockState::Stable => self.refresh_head(idx),
            BlockState::SplitPending => self.split(idx),
            BlockState::MergePending => self.merge(idx),
        }
    }

    #[inline]
    fn refresh_head(&mut self, idx: usize) {
        if let Some(&first) = self.blocks[idx].first() {
            self.heads[idx] = first;
        }
    }

    /// Split block `idx` at its midpoint. An insert overflow of `2B + 1` keys
    /// becomes `B` and `B + 1`.
    fn split(&mut self, idx: usize) {
        let len = self.blocks[idx].len();
        let right = self.blocks[idx].split_off(len / 2);
        tracing::debug!(block = idx, left = len / 2, right = right.len(), "split block");

        let right_head = right[0];
        self.blocks.insert(idx + 1, right);
        self.heads.insert(idx + 1, right_head);
        self.refresh_head(idx);
    }

    /// Merge block `idx` into a neighbour: the following block, or the
    /// preceding one when `idx` is last.
    fn merge(&mut self, idx: usize) {
        if self.blocks.len() == 1 {
            // Sole block just emptied.
            tracing::debug!(block = idx, "drop block");
            self.blocks.clear();
            self.heads.clear();
            return;
        }

        let left = if idx + 1 == self.blocks.len() {
            idx - 1
        } else {
            idx
        };
        let right = self.blocks.remove(left + 1);
        self.heads.remove(left + 1);
        tracing::debug!(
            block = left,
            left = self.blocks[left].len(),
            right = right.len(),
            "merge blocks"
        );
        self.blocks[left].extend(right);
        self.refresh_head(left);

        // A small block absorbed into a full neighbour can overshoot 2B.
        if self.blocks[left].len() > self.config.max_block_len() {
            self.split(left);
        }
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert_eq!(self.blocks.len(), self.heads.len());
        let sole = self.blocks.len() == 1;
        for (i, block) in self.blocks.iter().enumerate() {
            assert!(!block.is_empty(), "empty block {i}");
            assert_eq!(self.heads[i], block[0], "stale head {i}");
            assert!(block.len() <= self.config.max_block_len(), "oversized block {i}");
            if !sole {
                assert!(block.len() >= self.config.min_block_len(), "undersized block {i}");
            }
        }
        let keys = self.keys();
        assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys not ascending");
    }
}

impl Default for BlockedZsl {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            heads: Vec::new(),
            config: BlockedConfig::default(),
        }
    }
}

impl FromIterator<Key> for BlockedZsl {
    /// Collect with the default block size.
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        let mut zsl = Self::default();
        zsl.extend(iter);
        zsl
    }
}

impl Extend<Key> for BlockedZsl {
    fn extend<I: IntoIterator<Item = Key>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl std::fmt::Debug for BlockedZsl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl OrderedIndex for BlockedZsl {
    fn contains(&self, key: Key) -> bool {
        BlockedZsl::contains(self, key)
    }

    fn insert(&mut self, key: Key) {
        BlockedZsl::insert(self, key)
    }

    fn remove(&mut self, key: Key) -> bool {
        BlockedZsl::remove(self, key)
    }

    fn range_for_each<F: FnMut(Key)>(&self, lo: Key, hi: Key, f: F) {
        BlockedZsl::range_for_each(self, lo, hi, f)
    }

    fn keys(&self) -> Vec<Key> {
        BlockedZsl::keys(self)
    }

    fn len(&self) -> usize {
        BlockedZsl::len(self)
    }
}

// =============================================================================
// Range iterator
// =============================================================================

/// Ascending keys of a [`BlockedZsl`] within a half-open interval.
#[derive(Clone, Debug)]
pub struct Range<'a> {
    zsl: &'a BlockedZsl,
    block: usize,
    pos: usize,
    hi: Key,
}

impl<'a> Range<'a> {
    fn empty(zsl: &'a BlockedZsl, hi: Key) -> Self {
        Self {
            zsl,
            block: zsl.blocks.len(),
            pos: 0,
            hi,
        }
    }
}

impl<'a> Iterator for Range<'a> {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        while let Some(block) = self.zsl.blocks.get(self.block) {
            match block.get(self.pos) {
                Some(&key) if key < self.hi => {
                    self.pos += 1;
                    return Some(key);
                }
                Some(_) => break,
                None => {
                    self.block += 1;
                    self.pos = 0;
                    if self.zsl.heads.get(self.block).is_some_and(|&h| h >= self.hi) {
                        break;
                    }
                }
            }
        }
        self.block = self.zsl.blocks.len();
        None
    }
}

impl<'a> std::iter::FusedIterator for Range<'a> {}
