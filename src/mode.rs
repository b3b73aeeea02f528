//! Finding the most frequent elements of a sequence

use std::borrow::Borrow;

use crate::{ChainedMap, Error, Result};

/// The most frequent elements of a sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mode<K> {
    /// Every element that reaches the highest frequency, in counting-table order
    pub values: Vec<K>,
    /// How often each of `values` occurs
    pub frequency: usize,
}

/// Finds the element(s) occurring most often in `items`.
///
/// Frequencies are counted in a [`ChainedMap`] with roughly one bucket per
/// three items, hashed with `hash_function`. Ties are all reported, ordered
/// by their position in the counting table.
///
/// ```rust
/// use bucketmap::{find_mode, hash_functions::char_sum};
///
/// let mode = find_mode(&["apple", "apple", "grape", "melon", "melon", "peach"], char_sum).unwrap();
/// assert_eq!(mode.frequency, 2);
/// assert_eq!(mode.values.len(), 2);
/// ```
///
/// # Errors
///
/// Returns [`Error::EmptySequence`] when `items` is empty.
pub fn find_mode<K, Q>(items: &[K], hash_function: fn(&Q) -> u64) -> Result<Mode<K>>
where
    K: Borrow<Q> + Clone,
    Q: Eq + ?Sized,
{
    let only = match items {
        [] => return Err(Error::EmptySequence),
        [only] => only,
        _ => return Ok(count_modes(items, hash_function)),
    };
    Ok(Mode { values: vec![only.clone()], frequency: 1 })
}

/// Counts every element, then keeps the ones with the highest count
fn count_modes<K, Q>(items: &[K], hash_function: fn(&Q) -> u64) -> Mode<K>
where
    K: Borrow<Q> + Clone,
    Q: Eq + ?Sized,
{
    let mut counts = ChainedMap::new(items.len() / 3, hash_function);
    for item in items {
        counts.merge(item.clone(), 1_usize, |count, one| *count = count.saturating_add(one));
    }
    log::trace!(
        "counted {} distinct elements of {} in {} buckets",
        counts.size(),
        items.len(),
        counts.capacity()
    );

    let mut mode = Mode { values: Vec::new(), frequency: 0 };
    for (key, &count) in counts.iter() {
        if count > mode.frequency {
            mode.frequency = count;
            mode.values.clear();
        }
        if count == mode.frequency {
            mode.values.push(key.clone());
        }
    }
    mode
}
