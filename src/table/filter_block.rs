//! Filter Block
//!
//! A filter block holds one filter segment per 2^base_lg bytes of data-block
//! offsets. A reader maps a data block's starting offset to its segment and
//! asks the filter policy whether a key may be present.
//!
//! Segment `i` covers every key added while the data blocks being built
//! started in `[i << base_lg, (i + 1) << base_lg)`. Several small data blocks
//! can therefore share a segment, and a large one leaves empty segments
//! behind it.

use std::sync::Arc;

use crate::coding::{decode_fixed32, put_fixed32};
use crate::config::DEFAULT_FILTER_BASE_LG;
use crate::filter::FilterPolicy;

/// Trailer size: array offset (4) + base_lg (1)
const TRAILER_SIZE: usize = 5;

// =============================================================================
// Builder
// =============================================================================

/// Builds the filter block of one table
///
/// Calls must follow `(start_block add_key*)* finish`.
pub struct FilterBlockBuilder {
    policy: Arc<dyn FilterPolicy>,
    base_lg: u8,
    /// Flattened key contents of the pending segment
    keys: Vec<u8>,
    /// Starting index in `keys` of each pending key
    starts: Vec<usize>,
    /// Filter data computed so far
    result: Vec<u8>,
    /// Offset in `result` of each generated segment
    filter_offsets: Vec<u32>,
}

impl FilterBlockBuilder {
    /// Builder with the default 2 KiB segment granularity
    pub fn new(policy: Arc<dyn FilterPolicy>) -> Self {
        Self::with_base_lg(policy, DEFAULT_FILTER_BASE_LG)
    }

    /// Builder emitting one segment per 2^base_lg bytes of block offsets
    ///
    /// # Panics
    ///
    /// Panics if `base_lg` is 32 or more. `Options::filter_base_lg` from
    /// `OptionsBuilder::build` is always in range.
    pub fn with_base_lg(policy: Arc<dyn FilterPolicy>, base_lg: u8) -> Self {
        assert!(base_lg < 32, "filter base_lg must be below 32");
        Self {
            policy,
            base_lg,
            keys: Vec::new(),
            starts: Vec::new(),
            result: Vec::new(),
            filter_offsets: Vec::new(),
        }
    }

    /// Note that a data block starting at `block_offset` is about to be filled
    pub fn start_block(&mut self, block_offset: u64) {
        let filter_index = block_offset >> self.base_lg;
        debug_assert!(
            filter_index >= self.filter_offsets.len() as u64,
            "block offsets must not move backwards"
        );
        while filter_index > self.filter_offsets.len() as u64 {
            self.generate_filter();
        }
    }

    /// Buffer `key` for the current segment
    pub fn add_key(&mut self, key: &[u8]) {
        self.starts.push(self.keys.len());
        self.keys.extend_from_slice(key);
    }

    /// Serialize the filter block
    pub fn finish(mut self) -> Vec<u8> {
        // A table with no keys still gets one (empty) segment so readers
        // can answer "no match" for it
        if !self.starts.is_empty() || self.filter_offsets.is_empty() {
            self.generate_filter();
        }

        // Append array of per-filter offsets
        let array_offset = self.result.len() as u32;
        for &offset in &self.filter_offsets {
            put_fixed32(&mut self.result, offset);
        }

        put_fixed32(&mut self.result, array_offset);
        // Save encoding parameter in result
        self.result.push(self.base_lg);

        tracing::debug!(
            "Finished filter block: {} segments, {} bytes",
            self.filter_offsets.len(),
            self.result.len()
        );
        self.result
    }

    fn generate_filter(&mut self) {
        let num_keys = self.starts.len();
        if num_keys == 0 {
            // Fast path if there are no keys for this segment
            self.filter_offsets.push(self.result.len() as u32);
            return;
        }

        // Make list of keys from flattened key structure
        self.starts.push(self.keys.len()); // Simplify length computation
        let keys: Vec<&[u8]> = self
            .starts
            .windows(2)
            .map(|w| &self.keys[w[0]..w[1]])
            .collect();

        // Generate filter for current set of keys and append to result
        self.filter_offsets.push(self.result.len() as u32);
        let before = self.result.len();
        self.policy.create_filter(&keys, &mut self.result);

        tracing::trace!(
            "Generated filter segment {}: {} keys, {} bytes",
            self.filter_offsets.len() - 1,
            num_keys,
            self.result.len() - before
        );

        self.keys.clear();
        self.starts.clear();
    }
}

// =============================================================================
// Reader
// =============================================================================

/// Queries a finished filter block
///
/// Malformed contents never cause an error: the reader degrades to answering
/// "may match", which only costs a wasted block read.
pub struct FilterBlockReader<'a> {
    policy: &'a dyn FilterPolicy,
    /// Whole filter block
    data: &'a [u8],
    /// Offset of the segment offset array (end of filter data)
    offset: usize,
    /// Number of segments
    num: usize,
    base_lg: u8,
}

impl<'a> FilterBlockReader<'a> {
    /// Parse the trailer of `contents`; malformed contents give a reader
    /// that answers "may match" for every query
    pub fn new(policy: &'a dyn FilterPolicy, contents: &'a [u8]) -> Self {
        let mut reader = Self {
            policy,
            data: &[],
            offset: 0,
            num: 0,
            base_lg: 0,
        };

        let n = contents.len();
        if n < TRAILER_SIZE {
            return reader;
        }
        let base_lg = contents[n - 1];
        let last_word = decode_fixed32(&contents[n - TRAILER_SIZE..]) as usize;
        if last_word > n - TRAILER_SIZE {
            return reader;
        }

        reader.data = contents;
        reader.offset = last_word;
        reader.num = (n - TRAILER_SIZE - last_word) / 4;
        reader.base_lg = base_lg;
        reader
    }

    /// Number of segments the block describes (0 if unreadable)
    pub fn num_segments(&self) -> usize {
        self.num
    }

    /// False only if `key` is certainly absent from the data block that
    /// starts at `block_offset`
    pub fn key_may_match(&self, block_offset: u64, key: &[u8]) -> bool {
        let index = match block_offset.checked_shr(u32::from(self.base_lg)) {
            Some(index) => index,
            // Nonsensical base_lg; errors are treated as potential matches
            None => return true,
        };
        if index >= self.num as u64 {
            return true;
        }

        let slot = self.offset + index as usize * 4;
        let start = decode_fixed32(&self.data[slot..]) as usize;
        let limit = decode_fixed32(&self.data[slot + 4..]) as usize;
        if start <= limit && limit <= self.offset {
            if start == limit {
                // Empty filters do not match any keys
                return false;
            }
            return self.policy.key_may_match(key, &self.data[start..limit]);
        }

        // Errors are treated as potential matches
        true
    }
}
