//! The contract shared by every table variant

use crate::Result;

/// Load limit the open-addressing map starts with
pub const DEFAULT_OPEN_ADDRESSING_LOAD_LIMIT: f64 = 0.5;

/// Smallest load limit a table accepts; lower values are raised to it
pub const MIN_LOAD_LIMIT: f64 = 0.05;

/// Operations common to [`OpenAddressingMap`](crate::OpenAddressingMap) and
/// [`ChainedMap`](crate::ChainedMap).
///
/// Owned keys of type `K` are looked up through their borrowed form `Q`, so a
/// table keyed by `String` answers queries made with `&str`.
pub trait HashTable<K, V, Q: ?Sized = str> {
    /// Inserts or updates `key`, returning the value it replaced
    fn put(&mut self, key: K, value: V) -> Option<V>;

    /// Returns the value stored under `key`
    fn get(&self, key: &Q) -> Option<&V>;

    /// Returns true if a live entry exists for `key`
    fn contains_key(&self, key: &Q) -> bool;

    /// Removes `key`, returning its value. Absent keys leave the table unchanged.
    fn remove(&mut self, key: &Q) -> Option<V>;

    /// Rehashes every live entry into `new_capacity` buckets.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the table untouched, when the table variant
    /// cannot hold its entries in `new_capacity` buckets.
    fn resize_table(&mut self, new_capacity: usize) -> Result<()>;

    /// Number of buckets that hold no live entry
    fn empty_buckets(&self) -> usize;

    /// Ratio of live entries to buckets
    fn table_load(&self) -> f64;

    /// Drops every entry while keeping the capacity
    fn clear(&mut self);

    /// Live keys in bucket order
    fn get_keys(&self) -> Vec<K>
    where
        K: Clone;

    /// Number of live entries
    fn size(&self) -> usize;

    /// Number of buckets
    fn capacity(&self) -> usize;
}

/// Maps a hash onto a bucket index in `0..capacity`
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn home_index(hash: u64, capacity: usize) -> usize {
    // The remainder is below `capacity`, which came from a `usize`.
    (hash % (capacity.max(1) as u64)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChainedMap, OpenAddressingMap, hash_functions::char_sum};
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn open_addressing(capacity: usize) -> OpenAddressingMap<String, i32> {
        OpenAddressingMap::new(capacity, char_sum)
    }

    fn chained(capacity: usize) -> ChainedMap<String, i32> {
        ChainedMap::new(capacity, char_sum)
    }

    /// Runs the same scenario against any table variant
    fn exercise_contract<T: HashTable<String, i32>>(mut table: T) {
        assert_eq!(table.size(), 0);
        assert_eq!(table.get("missing"), None);
        assert!(!table.contains_key("missing"));
        assert_eq!(table.remove("missing"), None);

        for i in 0..40 {
            assert_eq!(table.put(format!("key{i}"), i), None);
        }
        assert_eq!(table.put("key7".to_string(), 700), Some(7));
        assert_eq!(table.size(), 40);
        assert_eq!(table.get("key7"), Some(&700));

        assert_eq!(table.remove("key3"), Some(3));
        assert!(!table.contains_key("key3"));
        assert_eq!(table.size(), 39);

        let before = table.capacity();
        table.resize_table(before.saturating_mul(3)).unwrap();
        assert!(table.capacity() >= before.saturating_mul(3));
        for i in (0..40).filter(|&i| i != 3 && i != 7) {
            assert_eq!(table.get(&format!("key{i}")), Some(&i));
        }

        let mut keys = table.get_keys();
        keys.sort();
        assert_eq!(keys.len(), 39);
        assert!(!keys.contains(&"key3".to_string()));

        let capacity = table.capacity();
        table.clear();
        assert!(table.get_keys().is_empty());
        assert!(table.table_load().abs() < f64::EPSILON);
        assert_eq!(table.empty_buckets(), capacity);
        assert_eq!(table.capacity(), capacity);
    }

    #[test]
    fn test_home_index() {
        assert_eq!(home_index(0, 10), 0);
        assert_eq!(home_index(378, 10), 8);
        assert_eq!(home_index(u64::MAX, 1), 0);
    }

    #[test]
    fn test_open_addressing_contract() {
        exercise_contract(open_addressing(10));
    }

    #[test]
    fn test_chained_contract() {
        exercise_contract(chained(10));
    }

    /// Operations applied to a table and to a reference `HashMap` side by side
    #[derive(Debug, Clone)]
    enum Action {
        Put(String, i32),
        Remove(String),
        Resize(usize),
    }

    fn action_strategy() -> impl Strategy<Value = Action> {
        let key = "[a-e]{1,3}";
        prop_oneof![
            4 => (key, any::<i32>()).prop_map(|(k, v)| Action::Put(k, v)),
            2 => key.prop_map(Action::Remove),
            1 => (1_usize..64).prop_map(Action::Resize),
        ]
    }

    /// Replays `actions` and checks the table against a `HashMap` after every step
    fn check_against_model<T: HashTable<String, i32>>(mut table: T, actions: Vec<Action>) {
        let mut model = HashMap::new();
        for action in actions {
            match action {
                Action::Put(key, value) => {
                    assert_eq!(table.put(key.clone(), value), model.insert(key, value));
                }
                Action::Remove(key) => {
                    assert_eq!(table.remove(&key), model.remove(&key));
                }
                Action::Resize(capacity) => {
                    let keys_before = table.get_keys().len();
                    if table.resize_table(capacity).is_ok() {
                        assert_eq!(table.get_keys().len(), keys_before);
                    }
                }
            }
            assert_eq!(table.size(), model.len());
        }

        let mut keys = table.get_keys();
        keys.sort();
        let mut expected: Vec<String> = model.keys().cloned().collect();
        expected.sort();
        // Every key appears once: the model has no duplicates.
        assert_eq!(keys, expected);
        for (key, value) in &model {
            assert_eq!(table.get(key), Some(value));
            assert!(table.contains_key(key));
        }
    }

    proptest! {
        #[test]
        fn open_addressing_matches_model(actions in proptest::collection::vec(action_strategy(), 1..300)) {
            check_against_model(open_addressing(4), actions);
        }

        #[test]
        fn chained_matches_model(actions in proptest::collection::vec(action_strategy(), 1..300)) {
            check_against_model(chained(4), actions);
        }
    }
}
