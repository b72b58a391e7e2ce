//! Fibonacci offsets and Zeckendorf decomposition.
//!
//! Offsets run `1, 2, 3, 5, 8, …` (`F[0] = 1`, `F[1] = 2`). Every positive
//! integer has exactly one representation as a sum of offsets with no two
//! adjacent indices; the static index derives its skip levels from it.

use smallvec::SmallVec;

/// Offset indices of a Zeckendorf decomposition, largest first.
///
/// A `usize` never needs more than ~46 terms, and typical ranks need far fewer.
pub type Terms = SmallVec<[usize; 16]>;

/// Growable table of Fibonacci offsets.
#[derive(Clone, Debug)]
pub struct FibOffsets {
    offsets: Vec<usize>,
}

impl FibOffsets {
    pub fn new() -> Self {
        Self {
            offsets: vec![1, 2],
        }
    }

    /// Table covering every offset `<= n`.
    pub fn up_to(n: usize) -> Self {
        let mut fibs = Self::new();
        fibs.ensure(n);
        fibs
    }

    /// Extend the table until its last offset exceeds `n` (or `usize` runs out).
    pub fn ensure(&mut self, n: usize) {
        loop {
            let len = self.offsets.len();
            let (a, b) = (self.offsets[len - 2], self.offsets[len - 1]);
            if b > n {
                break;
            }
            match a.checked_add(b) {
                Some(next) => self.offsets.push(next),
                None => break,
            }
        }
    }

    /// Number of offsets `<= n`, i.e. the number of skip levels for `n` keys.
    #[inline]
    pub fn level_count(&self, n: usize) -> usize {
        self.offsets.partition_point(|&f| f <= n)
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.offsets
    }
}

impl Default for FibOffsets {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for FibOffsets {
    type Output = usize;

    #[inline]
    fn index(&self, idx: usize) -> &usize {
        &self.offsets[idx]
    }
}

/// Greedy Zeckendorf decomposition of `value` over `offsets`.
///
/// Takes the largest offset that fits, then resumes two indices lower so no
/// two consecutive offsets are ever selected. `offsets` must reach `value`.
pub fn zeckendorf_terms(value: usize, offsets: &[usize]) -> Terms {
    let mut terms = Terms::new();
    let mut remaining = value;
    let mut idx = offsets.partition_point(|&f| f <= remaining);
    while remaining > 0 && idx > 0 {
        let i = idx - 1;
        if offsets[i] <= remaining {
            terms.push(i);
            remaining -= offsets[i];
            idx = i.saturating_sub(1);
        } else {
            idx = i;
        }
    }
    debug_assert_eq!(remaining, 0, "offset table too short for {value}");
    terms
}

/// Index of the smallest term in the decomposition of `value`, or `None` for 0.
#[inline]
pub fn smallest_term(value: usize, offsets: &[usize]) -> Option<usize> {
    zeckendorf_terms(value, offsets).last().copied()
}
