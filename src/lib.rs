//! # Bucket Map
//!
//! Hash maps built from first principles, with two collision-resolution
//! strategies behind one contract ([`HashTable`]):
//!
//! - `OpenAddressingMap`: a flat slot array probed quadratically from each
//!   key's home slot. Removals leave tombstones, and the map doubles itself
//!   before an insertion whenever its load factor reaches 0.5.
//! - `ChainedMap`: every bucket owns a singly linked list of entries. The load
//!   factor may grow past 1; the caller decides when to call `resize_table`,
//!   unless a load limit is configured.
//!
//! Both maps take the hash function as a plain `fn(&Q) -> u64`, see
//! [`hash_functions`] for ready-made ones. [`find_mode`] counts element
//! frequencies with a `ChainedMap` to report the most frequent elements of a
//! sequence.
//!
//! ## Basic Usage
//!
//! ```rust
//! use bucketmap::{OpenAddressingMap, hash_functions::char_sum};
//!
//! // Create a map with 10 slots
//! let mut map: OpenAddressingMap<String, i32> = OpenAddressingMap::new(10, char_sum);
//!
//! // Insert values
//! map.put("apple".to_string(), 1);
//! map.put("banana".to_string(), 2);
//!
//! // Retrieve values
//! assert_eq!(map.get("apple"), Some(&1));
//!
//! // Update values
//! map.put("apple".to_string(), 10);
//! assert_eq!(map.get("apple"), Some(&10));
//!
//! // Remove values
//! map.remove("apple");
//! assert_eq!(map.get("apple"), None);
//! assert_eq!(map.size(), 1);
//! ```
//!
//! ## Separate Chaining
//!
//! ```rust
//! use bucketmap::{ChainedMap, hash_functions::weighted_char_sum};
//!
//! let mut map: ChainedMap<String, i32> = ChainedMap::new(2, weighted_char_sum);
//! for i in 0..10 {
//!     map.put(format!("key{i}"), i);
//! }
//!
//! // Chaining never grows on its own by default
//! assert_eq!(map.capacity(), 2);
//! assert_eq!(map.table_load(), 5.0);
//!
//! map.resize_table(20).unwrap();
//! assert_eq!(map.get("key7"), Some(&7));
//! ```

/// Singly linked list backing each bucket of the chained map
mod chain;
/// Hash map with separate chaining
mod chained;
/// Errors reported by the tables
mod error;
/// Pluggable hash functions
pub mod hash_functions;
/// Mode finding on top of the chained map
mod mode;
/// Hash map with open addressing and quadratic probing
mod open_addressing;
/// The contract shared by both maps
mod table;

pub use chained::{ChainedMap, Iter as ChainedIter};
pub use error::{Error, Result};
pub use mode::{Mode, find_mode};
pub use open_addressing::{Iter as OpenAddressingIter, OpenAddressingMap};
pub use table::{DEFAULT_OPEN_ADDRESSING_LOAD_LIMIT, HashTable, MIN_LOAD_LIMIT};
