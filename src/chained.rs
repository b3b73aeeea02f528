use std::{borrow::Borrow, fmt, mem};

use crate::{
    Error, Result,
    chain::{Chain, ChainIter},
    table::{HashTable, MIN_LOAD_LIMIT, home_index},
};

/// A hash map resolving collisions by separate chaining.
///
/// Each bucket owns a singly linked list of entries, so any number of keys
/// can share a bucket and the load factor may exceed 1.
///
/// Unlike [`OpenAddressingMap`](crate::OpenAddressingMap) this map does not
/// grow on its own unless a [`max_load_factor`](Self::max_load_factor) is
/// configured; callers rebalance it with [`resize_table`](Self::resize_table).
///
/// Note: This implementation is not thread-safe.
pub struct ChainedMap<K, V, Q: ?Sized = str> {
    /// One chain per bucket
    buckets: Vec<Chain<K, V>>,
    /// Number of entries across all chains
    size: usize,
    /// Load factor at which `put` doubles the bucket count before inserting; `None` by default
    max_load_factor: Option<f64>,
    /// Maps a key to a non-negative integer; fixed for the lifetime of the table
    hash_function: fn(&Q) -> u64,
}

impl<K, V, Q: ?Sized> ChainedMap<K, V, Q> {
    /// Creates a map with `capacity` buckets (at least one) hashing keys with `hash_function`
    #[must_use]
    pub fn new(capacity: usize, hash_function: fn(&Q) -> u64) -> Self {
        Self { buckets: empty_chains(capacity.max(1)), size: 0, max_load_factor: None, hash_function }
    }

    /// Replaces the auto-grow limit, see [`set_max_load_factor`](Self::set_max_load_factor)
    #[must_use]
    pub fn with_max_load_factor(mut self, limit: Option<f64>) -> Self {
        self.set_max_load_factor(limit);
        self
    }

    /// Sets the load factor at which `put` doubles the bucket count before
    /// inserting a new key. Limits below `MIN_LOAD_LIMIT` are raised to it;
    /// `None` leaves resizing to the caller.
    pub fn set_max_load_factor(&mut self, limit: Option<f64>) {
        self.max_load_factor = limit.map(|limit| limit.max(MIN_LOAD_LIMIT));
    }

    /// Returns the auto-grow limit
    #[must_use]
    pub fn max_load_factor(&self) -> Option<f64> {
        self.max_load_factor
    }

    /// Returns the number of entries
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true if the map holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of buckets
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the ratio of entries to buckets
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn table_load(&self) -> f64 {
        self.size as f64 / self.buckets.len() as f64
    }

    /// Counts the buckets whose chain is empty
    #[must_use]
    pub fn empty_buckets(&self) -> usize {
        self.buckets.iter().filter(|chain| chain.is_empty()).count()
    }

    /// Returns the length of the longest chain
    #[must_use]
    pub fn longest_chain(&self) -> usize {
        self.buckets.iter().map(Chain::len).max().unwrap_or(0)
    }

    /// Drops every entry while keeping the bucket count
    pub fn clear(&mut self) {
        self.buckets.fill_with(Chain::new);
        self.size = 0;
    }

    /// Returns an iterator over the entries in bucket order, then chain order
    #[must_use]
    #[allow(clippy::iter_without_into_iter)]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { buckets: self.buckets.iter(), chain: None }
    }

    /// Returns an iterator over the keys in bucket order, then chain order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns a copy of every key in bucket order, then chain order
    #[must_use]
    pub fn get_keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.keys().cloned().collect()
    }
}

impl<K, V, Q> ChainedMap<K, V, Q>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    /// Returns the bucket index of `key` for the current capacity
    fn bucket_index(&self, key: &Q) -> usize {
        home_index((self.hash_function)(key), self.buckets.len())
    }

    /// Grows the table first if a new key would push it past the load limit
    fn grow_if_needed(&mut self) {
        if self.max_load_factor.is_some_and(|limit| self.table_load() >= limit) {
            self.rehash(self.buckets.len().saturating_mul(2));
        }
    }

    /// Inserts a key-value pair, or updates the value of an existing key.
    ///
    /// Returns the previous value when the key was already present.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(existing) = self.get_mut(key.borrow()) {
            return Some(mem::replace(existing, value));
        }
        self.insert_new(key, value);
        None
    }

    /// Counts `value` into the entry for `key`.
    ///
    /// A live key has `combine(&mut current, value)` applied in place; a new
    /// key is inserted with `value` as is. Returns true when a new entry was
    /// created.
    ///
    /// ```rust
    /// use bucketmap::{ChainedMap, hash_functions::char_sum};
    ///
    /// let mut counts: ChainedMap<&str, usize> = ChainedMap::new(4, char_sum);
    /// for word in ["a", "b", "a"] {
    ///     counts.merge(word, 1, |count, one| *count += one);
    /// }
    /// assert_eq!(counts.get("a"), Some(&2));
    /// assert_eq!(counts.get("b"), Some(&1));
    /// ```
    pub fn merge<F>(&mut self, key: K, value: V, combine: F) -> bool
    where
        F: FnOnce(&mut V, V),
    {
        if let Some(existing) = self.get_mut(key.borrow()) {
            combine(existing, value);
            return false;
        }
        self.insert_new(key, value);
        true
    }

    /// Appends an entry for a key known to be absent
    fn insert_new(&mut self, key: K, value: V) {
        self.grow_if_needed();
        let index = self.bucket_index(key.borrow());
        if let Some(chain) = self.buckets.get_mut(index) {
            chain.push_back(key, value);
            self.size = self.size.saturating_add(1);
        }
    }

    /// Returns the value stored under `key`
    pub fn get(&self, key: &Q) -> Option<&V> {
        self.buckets.get(self.bucket_index(key))?.find(key)
    }

    /// Returns a mutable reference to the value stored under `key`
    pub fn get_mut(&mut self, key: &Q) -> Option<&mut V> {
        let index = self.bucket_index(key);
        self.buckets.get_mut(index)?.find_mut(key)
    }

    /// Returns true if an entry exists for `key`
    pub fn contains_key(&self, key: &Q) -> bool {
        if self.size == 0 {
            return false;
        }
        self.get(key).is_some()
    }

    /// Unlinks the entry for `key` and returns its value
    pub fn remove(&mut self, key: &Q) -> Option<V> {
        let index = self.bucket_index(key);
        let (_, value) = self.buckets.get_mut(index)?.remove(key)?;
        self.size = self.size.saturating_sub(1);
        Some(value)
    }

    /// Rehashes every entry into `new_capacity` buckets.
    ///
    /// Chains hold any number of entries, so the new capacity may be smaller
    /// than the number of entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] for a zero capacity, leaving the table unchanged.
    pub fn resize_table(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity < 1 {
            log::trace!("rejected resize to zero buckets");
            return Err(Error::ZeroCapacity);
        }
        self.rehash(new_capacity);
        Ok(())
    }

    /// Moves every entry into a fresh bucket array of `new_capacity` chains
    fn rehash(&mut self, new_capacity: usize) {
        log::debug!(
            "rehashing {} entries from {} to {new_capacity} buckets",
            self.size,
            self.buckets.len()
        );

        // Entries are grouped first so every chain is built in one pass.
        let mut groups: Vec<Vec<(K, V)>> = Vec::with_capacity(new_capacity);
        groups.resize_with(new_capacity, Vec::new);
        for mut chain in mem::take(&mut self.buckets) {
            while let Some((key, value)) = chain.pop_front() {
                let index = home_index((self.hash_function)(key.borrow()), new_capacity);
                if let Some(group) = groups.get_mut(index) {
                    group.push((key, value));
                }
            }
        }

        self.buckets = groups.into_iter().map(|group| group.into_iter().collect()).collect();
    }
}

/// Builds a bucket array of `capacity` empty chains
fn empty_chains<K, V>(capacity: usize) -> Vec<Chain<K, V>> {
    let mut chains = Vec::with_capacity(capacity);
    chains.resize_with(capacity, Chain::new);
    chains
}

impl<K, V, Q> HashTable<K, V, Q> for ChainedMap<K, V, Q>
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

impl<K, V, Q> Extend<(K, V)> for ChainedMap<K, V, Q>
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

impl<K: Clone, V: Clone, Q: ?Sized> Clone for ChainedMap<K, V, Q> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            size: self.size,
            max_load_factor: self.max_load_factor,
            hash_function: self.hash_function,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, Q: ?Sized> fmt::Debug for ChainedMap<K, V, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// One line per bucket: `index:` followed by ` -> (key: value)` for each chained entry
impl<K: fmt::Display, V: fmt::Display, Q: ?Sized> fmt::Display for ChainedMap<K, V, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, chain) in self.buckets.iter().enumerate() {
            write!(f, "{index}:")?;
            for (key, value) in chain.iter() {
                write!(f, " -> ({key}: {value})")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Iterator over the entries of a [`ChainedMap`]
pub struct Iter<'a, K, V> {
    /// Buckets not yet visited
    buckets: std::slice::Iter<'a, Chain<K, V>>,
    /// Chain currently being walked
    chain: Option<ChainIter<'a, K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain.as_mut().and_then(Iterator::next) {
                return Some(entry);
            }
            self.chain = Some(self.buckets.next()?.iter());
        }
    }
}

impl<K, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("buckets_left", &self.buckets.len()).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_functions::{char_sum, weighted_char_sum};

    /// Hashes `"keyN"` to `N`
    fn trailing_number(key: &str) -> u64 {
        key.trim_start_matches(|c: char| !c.is_ascii_digit()).parse().unwrap_or(0)
    }

    #[test]
    fn test_put_and_get() {
        let mut map = ChainedMap::new(10, trailing_number);
        assert_eq!(map.put("key1".to_string(), 10), None);
        assert_eq!(map.put("key2".to_string(), 20), None);
        assert_eq!(map.put("key1".to_string(), 30), Some(10));

        assert_eq!(map.get("key1"), Some(&30));
        assert_eq!(map.get("key2"), Some(&20));
        assert_eq!(map.get("key3"), None);
        assert_eq!(map.size(), 2);
    }

    #[test]
    fn test_no_automatic_resize() {
        let mut map: ChainedMap<String, usize> = ChainedMap::new(50, char_sum);
        for i in 0..150 {
            map.put(format!("str{i}"), i * 100);
        }
        assert_eq!(map.capacity(), 50);
        assert_eq!(map.size(), 150);
        assert!((map.table_load() - 3.0).abs() < f64::EPSILON);
        for i in 0..150 {
            assert_eq!(map.get(&format!("str{i}")), Some(&(i * 100)));
        }
    }

    #[test]
    fn test_colliding_keys_share_a_bucket() {
        let mut map: ChainedMap<String, i32> = ChainedMap::new(10, char_sum);
        map.put("ab".to_string(), 1);
        map.put("ba".to_string(), 2);
        assert_eq!(map.empty_buckets(), 9);
        assert_eq!(map.longest_chain(), 2);
        assert_eq!(map.get("ab"), Some(&1));
        assert_eq!(map.get("ba"), Some(&2));
        assert_eq!(map.get_keys(), vec!["ab".to_string(), "ba".to_string()]);
    }

    #[test]
    fn test_empty_buckets() {
        let mut map: ChainedMap<String, i32> = ChainedMap::new(100, char_sum);
        assert_eq!(map.empty_buckets(), 100);
        map.put("key1".to_string(), 10);
        assert_eq!(map.empty_buckets(), 99);
        map.put("key2".to_string(), 20);
        assert_eq!(map.empty_buckets(), 98);
        map.put("key1".to_string(), 30);
        assert_eq!(map.empty_buckets(), 98);
        map.put("key4".to_string(), 40);
        assert_eq!(map.empty_buckets(), 97);
    }

    #[test]
    fn test_remove() {
        let mut map: ChainedMap<String, i32> = ChainedMap::new(10, char_sum);
        map.put("ab".to_string(), 1);
        map.put("ba".to_string(), 2);

        assert_eq!(map.remove("ab"), Some(1));
        assert_eq!(map.size(), 1);
        assert_eq!(map.get("ab"), None);
        assert_eq!(map.get("ba"), Some(&2));
        assert_eq!(map.empty_buckets(), 9);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut map: ChainedMap<String, i32> = ChainedMap::new(50, char_sum);
        assert_eq!(map.remove("key4"), None);
        map.put("key1".to_string(), 10);
        assert_eq!(map.remove("key4"), None);
        assert_eq!(map.size(), 1);
        assert_eq!(map.get("key1"), Some(&10));
    }

    #[test]
    fn test_contains_key() {
        let mut map: ChainedMap<String, i32> = ChainedMap::new(10, char_sum);
        assert!(!map.contains_key("key1"));
        map.put("key1".to_string(), 10);
        map.put("key2".to_string(), 20);
        map.put("key3".to_string(), 30);
        assert!(map.contains_key("key1"));
        assert!(!map.contains_key("key4"));
        map.remove("key3");
        assert!(!map.contains_key("key3"));
    }

    #[test]
    fn test_resize_table() {
        let mut map: ChainedMap<String, i32> = ChainedMap::new(20, char_sum);
        map.put("key1".to_string(), 10);
        map.resize_table(30).unwrap();
        assert_eq!(map.capacity(), 30);
        assert_eq!(map.size(), 1);
        assert_eq!(map.get("key1"), Some(&10));
        assert!(map.contains_key("key1"));
    }

    #[test]
    fn test_resize_below_size() {
        let mut map: ChainedMap<String, String> = ChainedMap::new(10, weighted_char_sum);
        for i in (100..200).step_by(10) {
            map.put(i.to_string(), (i * 10).to_string());
        }

        map.resize_table(1).unwrap();
        assert_eq!(map.capacity(), 1);
        assert_eq!(map.size(), 10);
        assert_eq!(map.longest_chain(), 10);

        map.put("200".to_string(), "2000".to_string());
        map.remove("100");
        map.resize_table(2).unwrap();
        let mut keys = map.get_keys();
        keys.sort();
        let expected: Vec<String> = (110..=200).step_by(10).map(|i: i32| i.to_string()).collect();
        assert_eq!(keys, expected);
        assert_eq!(map.get("150"), Some(&"1500".to_string()));
    }

    #[test]
    fn test_resize_rejects_zero() {
        let mut map: ChainedMap<String, i32> = ChainedMap::new(4, char_sum);
        map.put("key1".to_string(), 1);
        assert_eq!(map.resize_table(0), Err(Error::ZeroCapacity));
        assert_eq!(map.capacity(), 4);
        assert_eq!(map.get("key1"), Some(&1));
    }

    #[test]
    fn test_resize_keeps_every_key() {
        let mut map: ChainedMap<String, u64> = ChainedMap::new(75, weighted_char_sum);
        let keys: Vec<u64> = (1..1000).step_by(13).collect();
        for &key in &keys {
            map.put(key.to_string(), key * 42);
        }

        for capacity in (111..1000).step_by(117) {
            map.resize_table(capacity).unwrap();
            map.put("some key".to_string(), 0);
            assert!(map.contains_key("some key"));
            map.remove("some key");

            assert_eq!(map.capacity(), capacity);
            assert_eq!(map.size(), keys.len());
            for &key in &keys {
                assert!(map.contains_key(&key.to_string()));
                assert!(!map.contains_key(&(key + 1).to_string()));
            }
        }
    }

    #[test]
    fn test_shrink_to_one_bucket_keeps_order() {
        let mut map: ChainedMap<String, usize> = ChainedMap::new(64, char_sum);
        for i in 0..20_000 {
            map.put(format!("key{i}"), i);
        }
        let before = map.get_keys();

        map.resize_table(1).unwrap();
        assert_eq!(map.longest_chain(), 20_000);
        assert_eq!(map.size(), 20_000);
        assert_eq!(map.get("key19999"), Some(&19_999));

        // A single bucket holds the entries in the order the old buckets were walked.
        assert_eq!(map.get_keys(), before);
    }

    #[test]
    fn test_clone_long_chain() {
        let mut map: ChainedMap<u32, u32, u32> = ChainedMap::new(200_000, |key: &u32| u64::from(*key));
        map.extend((0..200_000).map(|i| (i, i)));
        assert_eq!(map.longest_chain(), 1);

        map.resize_table(1).unwrap();
        assert_eq!(map.longest_chain(), 200_000);

        let copy = map.clone();
        assert_eq!(copy.size(), 200_000);
        assert_eq!(copy.get(&199_999), Some(&199_999));
        map.clear();
        assert_eq!(copy.get(&0), Some(&0));
    }

    #[test]
    fn test_auto_grow_when_configured() {
        let mut map = ChainedMap::new(4, trailing_number).with_max_load_factor(Some(1.0));
        for i in 0..4 {
            map.put(format!("key{i}"), i);
        }
        assert_eq!(map.capacity(), 4);

        map.put("key4".to_string(), 4);
        assert_eq!(map.capacity(), 8);
        assert_eq!(map.size(), 5);

        // Updating an existing key never grows the table.
        for i in 0..5 {
            map.put(format!("key{i}"), i * 2);
        }
        assert_eq!(map.capacity(), 8);
    }

    #[test]
    fn test_merge_counts() {
        let mut map: ChainedMap<&str, usize> = ChainedMap::new(2, char_sum);
        assert!(map.merge("a", 1, |count, one| *count += one));
        assert!(!map.merge("a", 1, |count, one| *count += one));
        assert!(map.merge("b", 5, |count, one| *count += one));
        assert_eq!(map.get("a"), Some(&2));
        assert_eq!(map.get("b"), Some(&5));
        assert_eq!(map.size(), 2);
    }

    #[test]
    fn test_get_mut() {
        let mut map: ChainedMap<String, Vec<i32>> = ChainedMap::new(4, char_sum);
        map.put("key1".to_string(), vec![1]);
        if let Some(values) = map.get_mut("key1") {
            values.push(2);
        }
        assert_eq!(map.get("key1"), Some(&vec![1, 2]));
    }

    #[test]
    fn test_clear() {
        let mut map: ChainedMap<String, i32> = ChainedMap::new(50, char_sum);
        map.put("key1".to_string(), 10);
        map.put("key2".to_string(), 20);
        map.resize_table(100).unwrap();
        map.clear();

        assert_eq!(map.size(), 0);
        assert_eq!(map.capacity(), 100);
        assert_eq!(map.empty_buckets(), 100);
        assert!(map.get_keys().is_empty());
        assert!(map.table_load().abs() < f64::EPSILON);
    }

    #[test]
    fn test_display_and_debug() {
        let mut map: ChainedMap<String, i32> = ChainedMap::new(2, char_sum);
        map.put("ab".to_string(), 1);
        map.put("ba".to_string(), 2);
        let bucket = usize::try_from(char_sum("ab") % 2).unwrap();
        let line = map.to_string().lines().nth(bucket).map(str::to_owned);
        assert_eq!(line, Some(format!("{bucket}: -> (ab: 1) -> (ba: 2)")));
        assert_eq!(format!("{map:?}"), r#"{"ab": 1, "ba": 2}"#);
    }

    #[test]
    fn test_iter_spans_buckets() {
        let mut map = ChainedMap::new(3, trailing_number);
        map.extend((0..9).map(|i| (format!("key{i}"), i)));
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys.len(), 9);
        assert_eq!(keys.first().map(|key| key.as_str()), Some("key0"));
        assert_eq!(keys.get(1).map(|key| key.as_str()), Some("key3"));
        assert_eq!(map.iter().map(|(_, value)| value).sum::<i32>(), 36);
    }
}
