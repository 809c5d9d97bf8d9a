//! Filter Module
//!
//! Probabilistic membership filters consumed by filter blocks.
//!
//! ## Contract
//! For any key set `S`, a filter built by `create_filter(S)` must answer
//! `key_may_match(k, filter) == true` for every `k` in `S`. Keys outside `S`
//! may match (false positive) but never the other way round.

mod bloom;

pub use bloom::BloomFilterPolicy;

/// Strategy for building and probing filter payloads
pub trait FilterPolicy: Send + Sync {
    /// Name persisted with the table; a changed encoding needs a new name
    fn name(&self) -> &str;

    /// Append a filter summarizing `keys` to `dst`
    ///
    /// `dst` may already hold earlier filters; only append to it.
    fn create_filter(&self, keys: &[&[u8]], dst: &mut Vec<u8>);

    /// `filter` is the exact byte range a previous `create_filter` appended.
    /// Must return true if `key` was in that key set.
    fn key_may_match(&self, key: &[u8], filter: &[u8]) -> bool;
}
