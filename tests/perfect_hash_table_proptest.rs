// PerfectHashTable property tests.
//
// Property 1: round trip. Every (k, v) of a distinct-key input is found.
// Property 2: negative lookup. Keys outside the input are never found.
// Property 3: duplicate rejection. Repeating any key fails the build.
// Property 4: erase. Erased keys vanish; everything else is unaffected.
// Property 5: space bound. Σ slots ≤ 4n for every build.
use fks_table::{PerfectHashTable, PhtError};
use proptest::collection::{btree_map, hash_set, vec};
use proptest::prelude::*;
use std::collections::BTreeMap;

proptest! {
    #[test]
    fn prop_round_trip_ints(data in btree_map(any::<i64>(), any::<u32>(), 0..300)) {
        let table = PerfectHashTable::new(data.clone()).unwrap();
        prop_assert_eq!(table.len(), data.len());
        for (k, v) in &data {
            prop_assert_eq!(table.find(k), Some(v));
        }
    }

    #[test]
    fn prop_round_trip_strings(data in btree_map(".{0,12}", any::<u16>(), 0..200)) {
        let table = PerfectHashTable::new(data.clone()).unwrap();
        for (k, v) in &data {
            prop_assert_eq!(table.find(k.as_str()), Some(v));
        }
    }

    #[test]
    fn prop_negative_lookup(
        keys in hash_set(0u32..1_000_000, 1..300),
        absent in vec(1_000_000u32..u32::MAX, 1..300),
    ) {
        let table = PerfectHashTable::new(keys.iter().map(|&k| (k, k))).unwrap();
        for p in &absent {
            prop_assert_eq!(table.find(p), None);
            prop_assert!(!table.contains_key(p));
        }
    }

    #[test]
    fn prop_duplicate_rejected(
        data in btree_map("[a-z]{1,8}", any::<i32>(), 1..100),
        pick in any::<prop::sample::Index>(),
        other in any::<i32>(),
    ) {
        let mut entries: Vec<(String, i32)> = data.into_iter().collect();
        let dup = entries[pick.index(entries.len())].0.clone();
        entries.push((dup, other));
        prop_assert_eq!(PerfectHashTable::new(entries).unwrap_err(), PhtError::DuplicateKey);
    }

    #[test]
    fn prop_erase(
        data in btree_map(any::<u64>(), any::<u8>(), 1..200),
        mask in vec(any::<bool>(), 200),
    ) {
        let mut table = PerfectHashTable::new(data.clone()).unwrap();
        let mut model: BTreeMap<u64, u8> = data.clone();
        for ((k, _), &drop) in data.iter().zip(&mask) {
            if drop {
                prop_assert!(table.erase(k));
                prop_assert!(!table.erase(k));
                model.remove(k);
            }
        }
        for k in data.keys() {
            prop_assert_eq!(table.find(k), model.get(k));
        }
        prop_assert_eq!(table.iter().count(), model.len());
    }

    #[test]
    fn prop_space_bound(keys in hash_set(any::<u32>(), 0..2000)) {
        let n = keys.len();
        let table = PerfectHashTable::new(keys.into_iter().map(|k| (k, ()))).unwrap();
        prop_assert_eq!(table.bucket_count(), n);
        prop_assert!(table.slot_count() <= 4 * n);
    }
}
