//! Error type shared by both table variants and the mode finder

/// Alias for results produced by this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Operations the tables refuse to perform.
///
/// A rejected operation never changes the table it was called on.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A table needs at least one bucket.
    #[error("a hash table cannot be resized to zero buckets")]
    ZeroCapacity,

    /// Open addressing stores one entry per slot, so the new capacity must hold every live entry.
    #[error("cannot resize to {requested} buckets while the table holds {size} entries")]
    CapacityBelowSize {
        /// The capacity that was asked for
        requested: usize,
        /// The number of live entries at the time of the request
        size: usize,
    },

    /// The mode of an empty sequence is undefined.
    #[error("cannot find the mode of an empty sequence")]
    EmptySequence,
}
