use crate::builder::Builder;
use crate::error::PhtError;
use crate::hash::HashKey;
use std::borrow::Borrow;

/// One addressable cell of a bucket's second-level array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<K, V> {
    Empty,
    Occupied(K, V),
}

impl<K, V> Slot<K, V> {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    #[inline]
    fn take(&mut self) -> Option<(K, V)> {
        match std::mem::replace(self, Slot::Empty) {
            Slot::Occupied(k, v) => Some((k, v)),
            Slot::Empty => None,
        }
    }
}

/// Second-level table for the keys that landed in one first-level bucket.
/// Holds exactly k² slots for k keys.
#[derive(Debug, Clone)]
pub struct Bucket<K: HashKey, V> {
    pub(crate) second_hash: K::Family,
    pub(crate) slots: Box<[Slot<K, V>]>,
}

impl<K: HashKey, V> Bucket<K, V> {
    #[inline]
    fn position<Q>(&self, key: &Q) -> usize
    where
        Q: HashKey<Family = K::Family> + ?Sized,
    {
        (key.hash_with(&self.second_hash) % self.slots.len() as u64) as usize
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn slots(&self) -> &[Slot<K, V>] {
        &self.slots
    }
}

/// Counters collected while the table was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// First-level draws tried, including the accepted one.
    pub first_level_attempts: u32,
    /// Second-level draws tried, summed over all buckets.
    pub second_level_attempts: u32,
    /// Σ (bucket size)² of the accepted partition; at most `max_load_factor * n`.
    pub sum_of_squares: usize,
}

/// Static two-level perfect hash table.
///
/// The shape (bucket count, slot counts, hash coefficients) is frozen at
/// construction. Values can be replaced and entries erased, but the key set
/// never grows. Every lookup costs two hash evaluations and two array reads.
#[derive(Debug, Clone)]
pub struct PerfectHashTable<K: HashKey, V> {
    pub(crate) first_hash: K::Family,
    pub(crate) buckets: Vec<Option<Bucket<K, V>>>,
    pub(crate) len: usize,
    pub(crate) stats: BuildStats,
}

impl<K: HashKey, V> PerfectHashTable<K, V> {
    /// Build a table from distinct keys with the default configuration.
    pub fn new<I>(entries: I) -> Result<Self, PhtError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Builder::new().build(entries)
    }

    /// Number of keys the table was built from. Erasing does not shrink it.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of first-level buckets (equal to `len`).
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total second-level slots across all buckets.
    pub fn slot_count(&self) -> usize {
        self.buckets.iter().flatten().map(Bucket::slot_count).sum()
    }

    /// Populated first-level buckets.
    pub fn buckets(&self) -> impl Iterator<Item = &Bucket<K, V>> + '_ {
        self.buckets.iter().flatten()
    }

    #[inline]
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// The one slot `key` can occupy, if its first-level bucket is populated.
    #[inline]
    fn slot<Q>(&self, key: &Q) -> Option<&Slot<K, V>>
    where
        Q: HashKey<Family = K::Family> + ?Sized,
    {
        if self.len == 0 {
            return None;
        }
        let first = (key.hash_with(&self.first_hash) % self.len as u64) as usize;
        let bucket = self.buckets[first].as_ref()?;
        Some(&bucket.slots[bucket.position(key)])
    }

    #[inline]
    fn slot_mut<Q>(&mut self, key: &Q) -> Option<&mut Slot<K, V>>
    where
        Q: HashKey<Family = K::Family> + ?Sized,
    {
        if self.len == 0 {
            return None;
        }
        let first = (key.hash_with(&self.first_hash) % self.len as u64) as usize;
        let bucket = self.buckets[first].as_mut()?;
        let second = bucket.position(key);
        Some(&mut bucket.slots[second])
    }

    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: HashKey<Family = K::Family> + ?Sized,
    {
        // Keys outside the build set can land on an occupied slot.
        match self.slot(key)? {
            Slot::Occupied(k, v) if <K as Borrow<Q>>::borrow(k) == key => Some(v),
            _ => None,
        }
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: HashKey<Family = K::Family> + ?Sized,
    {
        match self.slot_mut(key)? {
            Slot::Occupied(k, v) if <K as Borrow<Q>>::borrow(&*k) == key => Some(v),
            _ => None,
        }
    }

    /// Like [`find_mut`](Self::find_mut), but absence is an error. The
    /// returned reference allows replacing the value in place.
    pub fn at<Q>(&mut self, key: &Q) -> Result<&mut V, PhtError>
    where
        K: Borrow<Q>,
        Q: HashKey<Family = K::Family> + ?Sized,
    {
        self.find_mut(key).ok_or(PhtError::KeyNotFound)
    }

    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: HashKey<Family = K::Family> + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Clear the slot holding `key`. The slot stays empty for the lifetime
    /// of the table.
    pub fn erase<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: HashKey<Family = K::Family> + ?Sized,
    {
        self.remove_entry(key).is_some()
    }

    /// Clear the slot holding `key` and return its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: HashKey<Family = K::Family> + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: HashKey<Family = K::Family> + ?Sized,
    {
        let slot = self.slot_mut(key)?;
        if matches!(&*slot, Slot::Occupied(k, _) if <K as Borrow<Q>>::borrow(k) == key) {
            slot.take()
        } else {
            None
        }
    }

    /// Live entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.buckets
            .iter()
            .flatten()
            .flat_map(|b| b.slots.iter())
            .filter_map(|slot| match slot {
                Slot::Occupied(k, v) => Some((k, v)),
                Slot::Empty => None,
            })
    }
}
