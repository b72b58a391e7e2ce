use crate::{BlockedZsl, Key, OrderedIndex, StaticZsl};

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeSet;

fn small_key() -> impl Strategy<Value = Key> {
    // Narrow domain so inserts, removes and lookups collide often.
    -128i64..128
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(#[proptest(strategy = "small_key()")] Key),
    #[proptest(weight = 3)]
    Remove(#[proptest(strategy = "small_key()")] Key),
    #[proptest(weight = 2)]
    Contains(#[proptest(strategy = "small_key()")] Key),
    #[proptest(weight = 1)]
    Range(
        #[proptest(strategy = "small_key()")] Key,
        #[proptest(strategy = "small_key()")] Key,
    ),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=1000)
}

fn collect_range<T: OrderedIndex>(t: &T, lo: Key, hi: Key) -> Vec<Key> {
    let mut out = Vec::new();
    t.range_for_each(lo, hi, |k| out.push(k));
    out
}

fn model_range(m: &BTreeSet<Key>, lo: Key, hi: Key) -> Vec<Key> {
    if lo >= hi {
        return Vec::new();
    }
    m.range(lo..hi).copied().collect()
}

/// Run `ops` against `t` and a `BTreeSet`, comparing every observable result.
fn check_equivalence<T: OrderedIndex>(t: &mut T, ops: &[Op]) -> Result<(), TestCaseError> {
    let mut m: BTreeSet<Key> = t.keys().into_iter().collect();
    for op in ops {
        match *op {
            Op::Insert(key) => {
                t.insert(key);
                m.insert(key);
            }
            Op::Remove(key) => {
                prop_assert_eq!(t.remove(key), m.remove(&key));
            }
            Op::Contains(key) => {
                prop_assert_eq!(t.contains(key), m.contains(&key));
            }
            Op::Range(lo, hi) => {
                prop_assert_eq!(collect_range(t, lo, hi), model_range(&m, lo, hi));
            }
        }
        prop_assert_eq!(t.len(), m.len());
    }

    let expected: Vec<Key> = m.iter().copied().collect();
    prop_assert_eq!(t.keys(), expected);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_static_equivalence(
        initial in prop::collection::vec(small_key(), 0..64),
        ops in ops_strategy(),
    ) {
        let mut t = StaticZsl::from_keys(initial);
        check_equivalence(&mut t, &ops)?;
    }

    #[test]
    fn prop_blocked_equivalence(
        initial in prop::collection::vec(small_key(), 0..64),
        block_size in 1usize..12,
        ops in ops_strategy(),
    ) {
        let mut t = BlockedZsl::from_keys(initial, block_size).unwrap();
        check_equivalence(&mut t, &ops)?;
        t.check_invariants();
    }

    #[test]
    fn prop_engines_agree_after_every_op(
        initial in prop::collection::vec(small_key(), 0..64),
        block_size in 1usize..12,
        ops in ops_strategy(),
    ) {
        let mut s = StaticZsl::from_keys(initial.iter().copied());
        let mut b = BlockedZsl::from_keys(initial, block_size).unwrap();
        prop_assert_eq!(s.keys(), b.keys());

        for op in ops {
            match op {
                Op::Insert(key) => {
                    s.insert(key);
                    b.insert(key);
                }
                Op::Remove(key) => {
                    prop_assert_eq!(s.remove(key), b.remove(key));
                }
                Op::Contains(key) => {
                    prop_assert_eq!(s.contains(key), b.contains(key));
                }
                Op::Range(lo, hi) => {
                    prop_assert_eq!(s.range(lo, hi).collect::<Vec<_>>(), b.range(lo, hi));
                }
            }
            prop_assert_eq!(s.keys(), b.keys());
        }
        b.check_invariants();
    }

    #[test]
    fn prop_insert_is_idempotent(
        initial in prop::collection::vec(small_key(), 1..64),
        pick in any::<prop::sample::Index>(),
        block_size in 1usize..12,
    ) {
        let key = initial[pick.index(initial.len())];

        let mut s = StaticZsl::from_keys(initial.iter().copied());
        let before = (s.keys(), s.len(), s.level_count());
        s.insert(key);
        prop_assert_eq!((s.keys(), s.len(), s.level_count()), before);

        let mut b = BlockedZsl::from_keys(initial, block_size).unwrap();
        let before = (b.keys(), b.block_lens());
        b.insert(key);
        prop_assert_eq!((b.keys(), b.block_lens()), before);
    }
}

#[test]
fn exhaustive_remove_order_small_set() {
    fn for_each_permutation(items: &[Key], f: &mut impl FnMut(&[Key])) {
        fn rec(
            items: &[Key],
            used: &mut [bool],
            out: &mut Vec<Key>,
            f: &mut impl FnMut(&[Key]),
        ) {
            if out.len() == items.len() {
                f(out.as_slice());
                return;
            }
            for i in 0..items.len() {
                if used[i] {
                    continue;
                }
                used[i] = true;
                out.push(items[i]);
                rec(items, used, out, f);
                out.pop();
                used[i] = false;
            }
        }

        let mut used = vec![false; items.len()];
        let mut out = Vec::with_capacity(items.len());
        rec(items, &mut used, &mut out, f);
    }

    let keys: Vec<Key> = vec![1, 2, 3, 4, 5, 6, 7];
    for block_size in 1..=4 {
        let base = BlockedZsl::from_keys(keys.iter().copied(), block_size).unwrap();
        for_each_permutation(&keys, &mut |perm| {
            let mut b = base.clone();
            let mut s = StaticZsl::from_keys(keys.iter().copied());
            for &k in perm {
                assert!(b.remove(k));
                assert!(s.remove(k));
                b.check_invariants();
                assert_eq!(b.keys(), s.keys());
            }
            assert!(b.is_empty());
            assert!(s.is_empty());
        });
    }
}
