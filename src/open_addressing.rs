use std::{borrow::Borrow, fmt, mem};

use crate::{
    Error, Result,
    table::{DEFAULT_OPEN_ADDRESSING_LOAD_LIMIT, HashTable, MIN_LOAD_LIMIT, home_index},
};

/// A key-value pair stored in a slot
#[derive(Debug, Clone)]
struct Entry<K, V> {
    /// The key in the key-value pair
    key: K,
    /// The value associated with the key
    value: V,
}

/// The state of a single slot in the bucket array
#[derive(Debug, Clone)]
enum Slot<K, V> {
    /// Never used since the last resize or clear; ends every probe sequence
    Empty,
    /// Holds a live entry
    Live(Entry<K, V>),
    /// Held an entry that was removed; probing continues past it and `put` may reuse it
    Tombstone,
}

/// Outcome of walking a key's probe sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// The slot holding the live entry for the key
    Found(usize),
    /// No live entry; the first tombstone or empty slot where the key may be placed
    Vacant(usize),
    /// Every reachable slot holds some other live key
    Exhausted,
}

/// Slot indices visited for one key: `home`, `home + 1`, `home + 4`, `home + 9`, ...
#[derive(Debug, Clone)]
struct ProbeSequence {
    /// Index the key hashes to
    home: usize,
    /// Number of buckets the sequence wraps around
    capacity: usize,
    /// Current quadratic factor
    step: usize,
}

impl ProbeSequence {
    /// Starts the sequence at `home`
    fn new(home: usize, capacity: usize) -> Self {
        Self { home, capacity, step: 0 }
    }
}

impl Iterator for ProbeSequence {
    type Item = usize;

    #[allow(clippy::arithmetic_side_effects)]
    fn next(&mut self) -> Option<Self::Item> {
        // `i * i mod capacity` repeats with period `capacity`, so later steps revisit slots.
        if self.step >= self.capacity {
            return None;
        }
        let square = (self.step % self.capacity).wrapping_mul(self.step % self.capacity);
        let index = (self.home % self.capacity + square % self.capacity) % self.capacity;
        self.step = self.step.saturating_add(1);
        Some(index)
    }
}

/// A hash map resolving collisions by open addressing with quadratic probing.
///
/// Every slot holds at most one entry. A removed entry leaves a tombstone
/// behind so probe sequences running through the slot keep going; the slot is
/// reused by a later `put` and discarded for good on the next resize.
///
/// The map grows itself: before a new key is placed, a load factor at or above
/// [`max_load_factor`](Self::max_load_factor) (0.5 by default) doubles the
/// capacity and rehashes every live entry.
///
/// Keys of type `K` are looked up through their borrowed form `Q` and hashed by
/// a caller supplied `fn(&Q) -> u64`.
///
/// Note: This implementation is not thread-safe.
pub struct OpenAddressingMap<K, V, Q: ?Sized = str> {
    /// The bucket array
    buckets: Vec<Slot<K, V>>,
    /// Number of live entries
    size: usize,
    /// Load factor at which `put` grows the table before inserting; `None` disables auto-grow
    max_load_factor: Option<f64>,
    /// Maps a key to a non-negative integer; fixed for the lifetime of the table
    hash_function: fn(&Q) -> u64,
}

impl<K, V, Q: ?Sized> OpenAddressingMap<K, V, Q> {
    /// Creates a map with `capacity` slots (at least one) hashing keys with `hash_function`
    #[must_use]
    pub fn new(capacity: usize, hash_function: fn(&Q) -> u64) -> Self {
        Self {
            buckets: empty_slots(capacity.max(1)),
            size: 0,
            max_load_factor: Some(DEFAULT_OPEN_ADDRESSING_LOAD_LIMIT),
            hash_function,
        }
    }

    /// Replaces the auto-grow limit, see [`set_max_load_factor`](Self::set_max_load_factor)
    #[must_use]
    pub fn with_max_load_factor(mut self, limit: Option<f64>) -> Self {
        self.set_max_load_factor(limit);
        self
    }

    /// Sets the load factor at which `put` grows the table.
    ///
    /// Limits are clamped into `[MIN_LOAD_LIMIT, 1.0]`. With `None` the table
    /// only grows when a key's probe sequence finds no usable slot.
    pub fn set_max_load_factor(&mut self, limit: Option<f64>) {
        self.max_load_factor = limit.map(|limit| limit.clamp(MIN_LOAD_LIMIT, 1.0));
    }

    /// Returns the auto-grow limit
    #[must_use]
    pub fn max_load_factor(&self) -> Option<f64> {
        self.max_load_factor
    }

    /// Returns the number of live entries
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true if the map holds no live entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of slots
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the ratio of live entries to slots
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn table_load(&self) -> f64 {
        self.size as f64 / self.buckets.len() as f64
    }

    /// Counts the slots that are empty or hold a tombstone
    #[must_use]
    pub fn empty_buckets(&self) -> usize {
        self.buckets.iter().filter(|slot| !matches!(slot, Slot::Live(_))).count()
    }

    /// Empties every slot, dropping tombstones too; the capacity is kept
    pub fn clear(&mut self) {
        self.buckets.fill_with(|| Slot::Empty);
        self.size = 0;
    }

    /// Returns an iterator over live entries in slot order
    #[must_use]
    #[allow(clippy::iter_without_into_iter)]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { slots: self.buckets.iter() }
    }

    /// Returns an iterator over live keys in slot order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns a copy of every live key in slot order
    #[must_use]
    pub fn get_keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.keys().cloned().collect()
    }
}

impl<K, V, Q> OpenAddressingMap<K, V, Q>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    /// Walks the probe sequence of `key`.
    ///
    /// The walk stops at the first empty slot or live match. Tombstones are
    /// skipped, but the first one seen is remembered as the place to insert,
    /// so a live entry further along is still found and never duplicated.
    fn probe(&self, key: &Q) -> Probe {
        let capacity = self.buckets.len();
        let home = home_index((self.hash_function)(key), capacity);
        let mut first_tombstone = None;

        for index in ProbeSequence::new(home, capacity) {
            match self.buckets.get(index) {
                None | Some(Slot::Empty) => return Probe::Vacant(first_tombstone.unwrap_or(index)),
                Some(Slot::Tombstone) => {
                    first_tombstone.get_or_insert(index);
                }
                Some(Slot::Live(entry)) if entry.key.borrow() == key => return Probe::Found(index),
                Some(Slot::Live(_)) => {}
            }
        }

        first_tombstone.map_or(Probe::Exhausted, Probe::Vacant)
    }

    /// Returns the slot index of the live entry for `key`
    fn find(&self, key: &Q) -> Option<usize> {
        match self.probe(key) {
            Probe::Found(index) => Some(index),
            Probe::Vacant(_) | Probe::Exhausted => None,
        }
    }

    /// Returns true if inserting a new key must first grow the table
    fn over_load_limit(&self) -> bool {
        self.max_load_factor.is_some_and(|limit| self.table_load() >= limit)
    }

    /// Inserts a key-value pair, or updates the value of a live key.
    ///
    /// The load check runs first, so the slot is chosen against the grown
    /// capacity. Returns the previous value when the key was already live.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if self.over_load_limit() {
            self.grow();
        }

        loop {
            let slot = match self.probe(key.borrow()) {
                Probe::Found(index) | Probe::Vacant(index) => self.buckets.get_mut(index),
                Probe::Exhausted => None,
            };

            match slot {
                Some(Slot::Live(entry)) => return Some(mem::replace(&mut entry.value, value)),
                Some(slot) => {
                    *slot = Slot::Live(Entry { key, value });
                    self.size = self.size.saturating_add(1);
                    return None;
                }
                None => {
                    log::trace!(
                        "probe sequence exhausted at capacity {}, growing before retry",
                        self.buckets.len()
                    );
                    self.grow();
                }
            }
        }
    }

    /// Returns the value stored under `key`
    pub fn get(&self, key: &Q) -> Option<&V> {
        match self.buckets.get(self.find(key)?) {
            Some(Slot::Live(entry)) => Some(&entry.value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value stored under `key`
    pub fn get_mut(&mut self, key: &Q) -> Option<&mut V> {
        let index = self.find(key)?;
        match self.buckets.get_mut(index) {
            Some(Slot::Live(entry)) => Some(&mut entry.value),
            _ => None,
        }
    }

    /// Returns true if a live entry exists for `key`; tombstones never match
    pub fn contains_key(&self, key: &Q) -> bool {
        self.find(key).is_some()
    }

    /// Replaces the live entry for `key` with a tombstone and returns its value
    pub fn remove(&mut self, key: &Q) -> Option<V> {
        let index = self.find(key)?;
        let slot = self.buckets.get_mut(index)?;
        match mem::replace(slot, Slot::Tombstone) {
            Slot::Live(entry) => {
                self.size = self.size.saturating_sub(1);
                Some(entry.value)
            }
            other => {
                *slot = other;
                None
            }
        }
    }

    /// Rehashes every live entry into `new_capacity` slots and drops all tombstones.
    ///
    /// Entries are re-inserted through [`put`](Self::put), so a capacity that
    /// leaves the table at or above its load limit grows again while the
    /// entries are being moved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] for a zero capacity and
    /// [`Error::CapacityBelowSize`] when `new_capacity` is smaller than the number
    /// of live entries. The table is unchanged in both cases.
    pub fn resize_table(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity < 1 {
            log::trace!("rejected resize to zero slots");
            return Err(Error::ZeroCapacity);
        }
        if new_capacity < self.size {
            log::trace!("rejected resize to {new_capacity} slots holding {} entries", self.size);
            return Err(Error::CapacityBelowSize { requested: new_capacity, size: self.size });
        }

        self.rehash(new_capacity);
        Ok(())
    }

    /// Doubles the capacity
    fn grow(&mut self) {
        self.rehash(self.buckets.len().saturating_mul(2));
    }

    /// Moves every live entry into a fresh bucket array of `new_capacity` slots
    fn rehash(&mut self, new_capacity: usize) {
        log::debug!(
            "rehashing {} entries from {} to {new_capacity} slots",
            self.size,
            self.buckets.len()
        );

        let mut table = Self {
            buckets: empty_slots(new_capacity),
            size: 0,
            max_load_factor: self.max_load_factor,
            hash_function: self.hash_function,
        };

        for slot in mem::take(&mut self.buckets) {
            if let Slot::Live(entry) = slot {
                table.put(entry.key, entry.value);
            }
        }

        *self = table;
    }
}

/// Builds a bucket array of `capacity` empty slots
fn empty_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || Slot::Empty);
    slots
}

impl<K, V, Q> HashTable<K, V, Q> for OpenAddressingMap<K, V, Q>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    fn put(&mut self, key: K, value: V) -> Option<V> {
        self.put(key, value)
    }

    fn get(&self, key: &Q) -> Option<&V> {
        self.get(key)
    }

    fn contains_key(&self, key: &Q) -> bool {
        self.contains_key(key)
    }

    fn remove(&mut self, key: &Q) -> Option<V> {
        self.remove(key)
    }

    fn resize_table(&mut self, new_capacity: usize) -> Result<()> {
        self.resize_table(new_capacity)
    }

    fn empty_buckets(&self) -> usize {
        self.empty_buckets()
    }

    fn table_load(&self) -> f64 {
        self.table_load()
    }

    fn clear(&mut self) {
        self.clear();
    }

    fn get_keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.get_keys()
    }

    fn size(&self) -> usize {
        self.size()
    }

    fn capacity(&self) -> usize {
        self.capacity()
    }
}

impl<K, V, Q> Extend<(K, V)> for OpenAddressingMap<K, V, Q>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K: Clone, V: Clone, Q: ?Sized> Clone for OpenAddressingMap<K, V, Q> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            size: self.size,
            max_load_factor: self.max_load_factor,
            hash_function: self.hash_function,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, Q: ?Sized> fmt::Debug for OpenAddressingMap<K, V, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// One line per slot: `index: key -> value`, `index: _` when empty,
/// `index: <tombstone>` after a removal
impl<K: fmt::Display, V: fmt::Display, Q: ?Sized> fmt::Display for OpenAddressingMap<K, V, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, slot) in self.buckets.iter().enumerate() {
            match slot {
                Slot::Empty => writeln!(f, "{index}: _")?,
                Slot::Live(entry) => writeln!(f, "{index}: {} -> {}", entry.key, entry.value)?,
                Slot::Tombstone => writeln!(f, "{index}: <tombstone>")?,
            }
        }
        Ok(())
    }
}

/// Iterator over the live entries of an [`OpenAddressingMap`]
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Remaining slots
    slots: std::slice::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.find_map(|slot| match slot {
            Slot::Live(entry) => Some((&entry.key, &entry.value)),
            Slot::Empty | Slot::Tombstone => None,
        })
    }
}
