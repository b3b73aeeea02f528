//! Hash functions that can be plugged into either table.
//!
//! A table stores a plain `fn(&Q) -> u64` and derives a bucket index with
//! `hash % capacity`, so any function with that shape works. The two
//! character-sum functions are deliberately weak: they collide often, which
//! makes them useful for exercising the collision paths.

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

/// Sums the Unicode scalar values of the key.
///
/// Anagrams collide: `char_sum("ab") == char_sum("ba")`.
#[must_use]
pub fn char_sum(key: &str) -> u64 {
    key.chars().map(u64::from).fold(0, u64::wrapping_add)
}

/// Sums the scalar values of the key weighted by their 1-based position.
#[must_use]
pub fn weighted_char_sum(key: &str) -> u64 {
    key.chars()
        .zip(1_u64..)
        .fold(0, |hash, (letter, position)| hash.wrapping_add(position.wrapping_mul(u64::from(letter))))
}

/// Hashes any hashable key with the standard library's `DefaultHasher`
#[must_use]
pub fn std_hash<Q: Hash + ?Sized>(key: &Q) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}
