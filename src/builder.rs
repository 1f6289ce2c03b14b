use crate::error::{Level, PhtError};
use crate::hash::{HashKey, UniversalHash};
use crate::table::{Bucket, BuildStats, PerfectHashTable, Slot};
use crate::util::{mix_seed, sum_of_squares};
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Build parameters.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// First-level draws to try before giving up.
    pub max_first_level_attempts: u32,
    /// Second-level draws to try per bucket before giving up.
    pub max_second_level_attempts: u32,
    /// A first-level draw is accepted when Σ size² ≤ `max_load_factor * n`.
    pub max_load_factor: usize,
    /// Fixed seed for reproducible builds; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_first_level_attempts: 100,
            max_second_level_attempts: 100,
            max_load_factor: 4,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Builder {
    cfg: BuildConfig,
}

/// Accepted first-level split: input indices per bucket.
#[derive(Debug)]
struct Partition {
    members: Vec<Vec<usize>>,
    sum_of_squares: usize,
}

/// Outcome of one first-level draw.
#[derive(Debug)]
enum Draw {
    Accepted(Partition),
    Overloaded(usize),
}

type BuiltBucket<K, V> = Option<(Bucket<K, V>, u32)>;

impl Builder {
    pub fn new() -> Self {
        Self {
            cfg: BuildConfig::default(),
        }
    }

    pub fn with_config(mut self, cfg: BuildConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Build the table. Keys must be distinct.
    pub fn build<K, V, I>(self, entries: I) -> Result<PerfectHashTable<K, V>, PhtError>
    where
        K: HashKey,
        I: IntoIterator<Item = (K, V)>,
    {
        self.build_with(entries, |groups, seed, max_attempts| {
            groups
                .into_iter()
                .enumerate()
                .map(|(i, group)| build_bucket(group, mix_seed(seed, i as u64), max_attempts))
                .collect()
        })
    }

    /// Same as [`build`](Self::build), with buckets placed on the rayon pool.
    /// Given the same seed both produce identical tables.
    #[cfg(feature = "parallel")]
    pub fn build_par<K, V, I>(self, entries: I) -> Result<PerfectHashTable<K, V>, PhtError>
    where
        K: HashKey + Send,
        V: Send,
        I: IntoIterator<Item = (K, V)>,
    {
        use rayon::prelude::*;

        self.build_with(entries, |groups, seed, max_attempts| {
            groups
                .into_par_iter()
                .enumerate()
                .map(|(i, group)| build_bucket(group, mix_seed(seed, i as u64), max_attempts))
                .collect()
        })
    }

    fn build_with<K, V, I, F>(
        self,
        entries: I,
        second_level: F,
    ) -> Result<PerfectHashTable<K, V>, PhtError>
    where
        K: HashKey,
        I: IntoIterator<Item = (K, V)>,
        F: FnOnce(Vec<Vec<(K, V)>>, u64, u32) -> Result<Vec<BuiltBucket<K, V>>, PhtError>,
    {
        let entries: Vec<(K, V)> = entries.into_iter().collect();
        let n = entries.len();
        let mut rng = match self.cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        if n == 0 {
            debug!("built empty table");
            return Ok(PerfectHashTable {
                first_hash: K::Family::random(&mut rng),
                buckets: Vec::new(),
                len: 0,
                stats: BuildStats::default(),
            });
        }

        // 1) First level: find a draw satisfying the load bound.
        let (first_hash, partition, first_level_attempts) = self.first_level(&entries, &mut rng)?;
        let sum = partition.sum_of_squares;

        // 2) Second level: every bucket gets its own rng stream.
        let bucket_seed = rng.next_u64();
        let groups = partition.into_groups(entries);
        let built = second_level(groups, bucket_seed, self.cfg.max_second_level_attempts)?;

        // 3) Assemble.
        let mut second_level_attempts = 0u32;
        let buckets: Vec<Option<Bucket<K, V>>> = built
            .into_iter()
            .map(|b| {
                b.map(|(bucket, attempts)| {
                    second_level_attempts = second_level_attempts.saturating_add(attempts);
                    bucket
                })
            })
            .collect();

        let stats = BuildStats {
            first_level_attempts,
            second_level_attempts,
            sum_of_squares: sum,
        };
        debug!(
            "built table: n={n}, slots={sum}, first-level attempts={first_level_attempts}, \
             second-level attempts={second_level_attempts}"
        );

        Ok(PerfectHashTable {
            first_hash,
            buckets,
            len: n,
            stats,
        })
    }

    fn first_level<K: HashKey, V>(
        &self,
        entries: &[(K, V)],
        rng: &mut StdRng,
    ) -> Result<(K::Family, Partition, u32), PhtError> {
        let limit = self.cfg.max_load_factor.saturating_mul(entries.len());
        let attempts = self.cfg.max_first_level_attempts;
        let mut family = K::Family::random(rng);

        for attempt in 1..=attempts {
            if attempt > 1 {
                family.regenerate(rng);
            }
            match partition(entries, &family, limit)? {
                Draw::Accepted(p) => return Ok((family, p, attempt)),
                Draw::Overloaded(sum) => {
                    debug!("first-level draw {attempt} rejected: sum of squares {sum} > {limit}");
                }
            }
        }

        warn!("first-level hashing gave up after {attempts} attempts");
        Err(PhtError::Exhausted {
            level: Level::First,
            attempts,
        })
    }
}

/// One first-level draw: split keys by `hash % n` and check the load bound.
/// Equal keys always share a bucket, so duplicates are caught here on the
/// very first pass regardless of whether the draw is accepted.
fn partition<K: HashKey, V>(
    entries: &[(K, V)],
    family: &K::Family,
    limit: usize,
) -> Result<Draw, PhtError> {
    let n = entries.len();
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); n];

    for (i, (key, _)) in entries.iter().enumerate() {
        let b = (key.hash_with(family) % n as u64) as usize;
        if members[b].iter().any(|&j| entries[j].0 == *key) {
            return Err(PhtError::DuplicateKey);
        }
        members[b].push(i);
    }

    let sum = sum_of_squares(members.iter().map(Vec::len));
    if sum > limit {
        return Ok(Draw::Overloaded(sum));
    }
    Ok(Draw::Accepted(Partition {
        members,
        sum_of_squares: sum,
    }))
}

impl Partition {
    /// Move every entry into the group of its bucket.
    fn into_groups<K, V>(self, entries: Vec<(K, V)>) -> Vec<Vec<(K, V)>> {
        let mut owner = vec![0usize; entries.len()];
        for (b, members) in self.members.iter().enumerate() {
            for &i in members {
                owner[i] = b;
            }
        }

        let mut groups: Vec<Vec<(K, V)>> = self
            .members
            .iter()
            .map(|m| Vec::with_capacity(m.len()))
            .collect();
        for (entry, b) in entries.into_iter().zip(owner) {
            groups[b].push(entry);
        }
        groups
    }
}

/// Second level for one bucket: k keys into k² slots with no collision.
fn build_bucket<K: HashKey, V>(
    group: Vec<(K, V)>,
    seed: u64,
    max_attempts: u32,
) -> Result<BuiltBucket<K, V>, PhtError> {
    if group.is_empty() {
        return Ok(None);
    }

    let size = group.len() * group.len();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut family = K::Family::random(&mut rng);
    let mut taken = vec![false; size];
    let mut positions = Vec::with_capacity(group.len());

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            family.regenerate(&mut rng);
            taken.fill(false);
            positions.clear();
        }
        if try_place(&group, &family, &mut taken, &mut positions) {
            let mut slots: Vec<Slot<K, V>> = (0..size).map(|_| Slot::Empty).collect();
            for ((k, v), pos) in group.into_iter().zip(positions) {
                slots[pos] = Slot::Occupied(k, v);
            }
            let bucket = Bucket {
                second_hash: family,
                slots: slots.into_boxed_slice(),
            };
            return Ok(Some((bucket, attempt)));
        }
        trace!("second-level draw {attempt} collided (bucket of {} keys)", group.len());
    }

    warn!(
        "second-level hashing gave up after {max_attempts} attempts (bucket of {} keys)",
        group.len()
    );
    Err(PhtError::Exhausted {
        level: Level::Second,
        attempts: max_attempts,
    })
}

#[inline]
fn try_place<K: HashKey, V>(
    group: &[(K, V)],
    family: &K::Family,
    taken: &mut [bool],
    positions: &mut Vec<usize>,
) -> bool {
    let size = taken.len() as u64;
    for (key, _) in group {
        let pos = (key.hash_with(family) % size) as usize;
        if taken[pos] {
            return false;
        }
        taken[pos] = true;
        positions.push(pos);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::AffineHash;

    fn seeded(seed: u64) -> Builder {
        Builder::new().with_config(BuildConfig {
            seed: Some(seed),
            ..Default::default()
        })
    }

    #[test]
    fn partition_rejects_duplicates_on_any_draw() {
        let entries = vec![(5i32, 'a'), (9, 'b'), (5, 'c')];
        let family = AffineHash::with_coefficients([1, 0, 0], 0);
        // even with an impossible limit the duplicate is reported first
        let res = partition(&entries, &family, 0);
        assert!(matches!(res, Err(PhtError::DuplicateKey)));
    }

    #[test]
    fn partition_reports_overload() {
        // identity hash with n = 4: all four keys land in bucket 0, Σ = 16
        let entries: Vec<(u32, ())> = vec![(0, ()), (4, ()), (8, ()), (12, ())];
        let family = AffineHash::with_coefficients([1, 0, 0], 0);
        match partition(&entries, &family, 16).unwrap() {
            Draw::Accepted(p) => {
                assert_eq!(p.sum_of_squares, 16);
                assert_eq!(p.members[0], vec![0, 1, 2, 3]);
            }
            Draw::Overloaded(_) => panic!("16 <= 16 must be accepted"),
        }
        match partition(&entries, &family, 15).unwrap() {
            Draw::Overloaded(sum) => assert_eq!(sum, 16),
            Draw::Accepted(_) => panic!("16 > 15 must be rejected"),
        }
    }

    #[test]
    fn groups_follow_members() {
        let entries = vec![("a", 1), ("b", 2), ("c", 3)];
        let p = Partition {
            members: vec![vec![2], vec![], vec![0, 1]],
            sum_of_squares: 5,
        };
        let groups = p.into_groups(entries);
        assert_eq!(groups[0], vec![("c", 3)]);
        assert!(groups[1].is_empty());
        assert_eq!(groups[2], vec![("a", 1), ("b", 2)]);
    }

    #[test]
    fn bucket_places_every_key_once() {
        let group: Vec<(String, usize)> = (0..12).map(|i| (format!("key-{i}"), i)).collect();
        let (bucket, attempts) = build_bucket(group, 17, 100).unwrap().unwrap();
        assert!(attempts >= 1);
        assert_eq!(bucket.slot_count(), 144);
        let live = bucket.slots.iter().filter(|s| !s.is_empty()).count();
        assert_eq!(live, 12);
    }

    #[test]
    fn empty_group_has_no_bucket() {
        let built = build_bucket::<u32, ()>(Vec::new(), 1, 100).unwrap();
        assert!(built.is_none());
    }

    #[test]
    fn zero_budgets_exhaust() {
        let first = Builder::new()
            .with_config(BuildConfig {
                max_first_level_attempts: 0,
                ..Default::default()
            })
            .build(vec![(1u8, ())]);
        assert_eq!(
            first.unwrap_err(),
            PhtError::Exhausted {
                level: Level::First,
                attempts: 0
            }
        );

        let second = Builder::new()
            .with_config(BuildConfig {
                max_second_level_attempts: 0,
                ..Default::default()
            })
            .build(vec![(1u8, ())]);
        assert_eq!(
            second.unwrap_err(),
            PhtError::Exhausted {
                level: Level::Second,
                attempts: 0
            }
        );
    }

    #[test]
    fn same_seed_same_shape() {
        let keys: Vec<(u64, u64)> = (0..500).map(|k| (k * 7919, k)).collect();
        let a = seeded(99).build(keys.clone()).unwrap();
        let b = seeded(99).build(keys).unwrap();
        assert_eq!(a.stats(), b.stats());
        assert_eq!(a.slot_count(), b.slot_count());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matches_sequential() {
        let keys: Vec<(String, usize)> = (0..2000).map(|i| (format!("k{i:05}"), i)).collect();
        let seq = seeded(5).build(keys.clone()).unwrap();
        let par = seeded(5).build_par(keys.clone()).unwrap();
        assert_eq!(seq.stats(), par.stats());
        for (k, v) in &keys {
            assert_eq!(par.find(k.as_str()), Some(v));
        }
    }
}
