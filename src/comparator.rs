//! Key comparators
//!
//! Total orders over keys, consumed by block building and seeking.

use std::cmp::Ordering;

/// A total order over byte-string keys
///
/// Must stay consistent for the lifetime of any block built or read with it.
pub trait Comparator: Send + Sync {
    /// Name persisted alongside data so mismatched orderings can be detected
    fn name(&self) -> &str;

    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;
}

/// Lexicographic byte-wise order
#[derive(Debug, Clone, Copy, Default)]
pub struct BytewiseComparator;

impl Comparator for BytewiseComparator {
    fn name(&self) -> &str {
        "atlasfmt.BytewiseComparator"
    }

    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}
