//! Block Builder
//!
//! Accumulates sorted key/value pairs into one prefix-compressed data block.
//!
//! When a key is stored, the prefix it shares with the previous key is
//! dropped. Every `block_restart_interval` keys the full key is stored
//! instead; these restart points are listed in the block trailer so a
//! reader can binary-search them without decoding the whole block.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::coding::{put_fixed32, put_varint32};
use crate::comparator::Comparator;
use crate::config::Options;

/// Builder for a single data block, reusable through `reset()`
pub struct BlockBuilder {
    /// Key order, checked in debug builds
    comparator: Arc<dyn Comparator>,
    /// Entries between restart points
    restart_interval: usize,
    /// Destination buffer
    buffer: Vec<u8>,
    /// Restart points (offsets into `buffer`)
    restarts: Vec<u32>,
    /// Entries emitted since the last restart
    counter: usize,
    /// `finish()` has been called
    finished: bool,
    /// Full key of the last entry
    last_key: Vec<u8>,
}

impl BlockBuilder {
    /// Create a builder using the comparator and restart interval of `options`
    ///
    /// # Panics
    ///
    /// Panics if `block_restart_interval` is 0. `Options` from
    /// `OptionsBuilder::build` never are.
    pub fn new(options: &Options) -> Self {
        assert!(
            options.block_restart_interval >= 1,
            "block_restart_interval must be at least 1"
        );
        Self {
            comparator: Arc::clone(&options.comparator),
            restart_interval: options.block_restart_interval,
            buffer: Vec::new(),
            // First restart point is at offset 0
            restarts: vec![0],
            counter: 0,
            finished: false,
            last_key: Vec::new(),
        }
    }

    /// Return to the freshly constructed state, keeping allocations
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.restarts.clear();
        self.restarts.push(0);
        self.counter = 0;
        self.finished = false;
        self.last_key.clear();
    }

    /// Append an entry
    ///
    /// REQUIRES: `finish()` has not been called since the last `reset()`, and
    /// `key` is larger than any previously added key.
    pub fn add(&mut self, key: &[u8], value: &[u8]) {
        debug_assert!(!self.finished, "add() called on a finished block");
        debug_assert!(self.counter <= self.restart_interval);
        debug_assert!(
            self.buffer.is_empty()
                || self.comparator.compare(key, &self.last_key) == Ordering::Greater,
            "keys must be added in strictly increasing order"
        );

        let mut shared = 0;
        if self.counter < self.restart_interval {
            // See how much sharing to do with the previous key
            shared = self
                .last_key
                .iter()
                .zip(key)
                .take_while(|(a, b)| a == b)
                .count();
        } else {
            // Restart compression
            self.restarts.push(self.buffer.len() as u32);
            self.counter = 0;
        }
        let non_shared = key.len() - shared;

        // <shared><non_shared><value_size> <key delta><value>
        put_varint32(&mut self.buffer, shared as u32);
        put_varint32(&mut self.buffer, non_shared as u32);
        put_varint32(&mut self.buffer, value.len() as u32);
        self.buffer.extend_from_slice(&key[shared..]);
        self.buffer.extend_from_slice(value);

        self.last_key.truncate(shared);
        self.last_key.extend_from_slice(&key[shared..]);
        debug_assert_eq!(self.last_key.as_slice(), key);
        self.counter += 1;
    }

    /// Append the restart trailer and return the finished block contents
    ///
    /// The slice stays valid until the builder is reset or dropped.
    pub fn finish(&mut self) -> &[u8] {
        if !self.finished {
            for &restart in &self.restarts {
                put_fixed32(&mut self.buffer, restart);
            }
            put_fixed32(&mut self.buffer, self.restarts.len() as u32);
            self.finished = true;
        }
        &self.buffer
    }

    /// Estimated size of the block being built, trailer included
    pub fn current_size_estimate(&self) -> usize {
        if self.finished {
            return self.buffer.len();
        }
        self.buffer.len()                        // Raw data buffer
            + self.restarts.len() * 4            // Restart array
            + 4                                  // Restart array length
    }

    /// True if no entries have been added since the last reset
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
