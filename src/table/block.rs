//! Block
//!
//! Read side of a finished data block: trailer validation, sequential
//! decoding and binary search over restart points.

use std::cmp::Ordering;

use bytes::Bytes;

use crate::coding::{decode_fixed32, Decoder};
use crate::comparator::Comparator;
use crate::error::{AtlasError, Result};

/// Size of one restart array slot / of the restart count
const U32_SIZE: usize = 4;

/// An immutable, decoded view of a data block
#[derive(Debug, Clone)]
pub struct Block {
    /// Full block contents, trailer included
    data: Bytes,
    /// Offset of the restart array in `data`
    restart_offset: usize,
    num_restarts: usize,
}

impl Block {
    /// Validate the trailer of `contents` and wrap it
    pub fn new(contents: Bytes) -> Result<Self> {
        let size = contents.len();
        if size < U32_SIZE {
            return Err(AtlasError::Corruption(format!(
                "block too short: {} bytes",
                size
            )));
        }

        let num_restarts = decode_fixed32(&contents[size - U32_SIZE..]) as usize;
        let max_restarts_allowed = (size - U32_SIZE) / U32_SIZE;
        if num_restarts > max_restarts_allowed {
            return Err(AtlasError::Corruption(format!(
                "block of {} bytes claims {} restart points",
                size, num_restarts
            )));
        }

        let restart_offset = size - (1 + num_restarts) * U32_SIZE;
        Ok(Self {
            data: contents,
            restart_offset,
            num_restarts,
        })
    }

    /// Total size of the block in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn num_restarts(&self) -> usize {
        self.num_restarts
    }

    /// Offset of the `index`-th restart point
    pub fn restart_point(&self, index: usize) -> u32 {
        debug_assert!(index < self.num_restarts);
        decode_fixed32(&self.data[self.restart_offset + index * U32_SIZE..])
    }

    /// Create an unpositioned iterator over the block
    pub fn iter<'a>(&'a self, comparator: &'a dyn Comparator) -> BlockIter<'a> {
        BlockIter {
            block: self,
            comparator,
            data: &self.data[..],
            current: self.restart_offset,
            restart_index: self.num_restarts,
            key: Vec::new(),
            value: (self.restart_offset, self.restart_offset),
            status: None,
            positioned: false,
            yield_current: false,
        }
    }
}

/// Cursor over the entries of a [`Block`]
///
/// Positioning methods (`seek_to_first`, `seek`, `advance`) follow the usual
/// seek/valid/key/value protocol. The `Iterator` impl yields owned pairs
/// starting at the current entry (or at the first entry if unpositioned).
pub struct BlockIter<'a> {
    block: &'a Block,
    comparator: &'a dyn Comparator,
    data: &'a [u8],
    /// Offset of the current entry; equals the restart offset when invalid
    current: usize,
    /// Index of the restart block containing `current`
    restart_index: usize,
    key: Vec<u8>,
    /// Byte range of the current value in `data`
    value: (usize, usize),
    status: Option<String>,
    positioned: bool,
    yield_current: bool,
}

impl<'a> BlockIter<'a> {
    pub fn valid(&self) -> bool {
        self.current < self.block.restart_offset
    }

    /// Key of the current entry. REQUIRES: `valid()`
    pub fn key(&self) -> &[u8] {
        debug_assert!(self.valid());
        &self.key
    }

    /// Value of the current entry. REQUIRES: `valid()`
    pub fn value(&self) -> &'a [u8] {
        debug_assert!(self.valid());
        let data: &'a [u8] = self.data;
        &data[self.value.0..self.value.1]
    }

    /// `Err(Corruption)` if decoding hit a malformed entry
    pub fn status(&self) -> Result<()> {
        match &self.status {
            Some(msg) => Err(AtlasError::Corruption(msg.clone())),
            None => Ok(()),
        }
    }

    /// Move to the next entry. REQUIRES: `valid()`
    pub fn advance(&mut self) {
        debug_assert!(self.valid());
        self.parse_next_key();
    }

    pub fn seek_to_first(&mut self) {
        self.positioned = true;
        self.yield_current = true;
        if self.block.num_restarts == 0 {
            self.mark_exhausted();
            return;
        }
        self.seek_to_restart_point(0);
        self.parse_next_key();
    }

    /// Position at the first entry with key >= `target`
    pub fn seek(&mut self, target: &[u8]) {
        self.positioned = true;
        self.yield_current = true;
        if self.block.num_restarts == 0 {
            self.mark_exhausted();
            return;
        }

        // Binary search in the restart array for the last restart point
        // with a key < target
        let mut left = 0;
        let mut right = self.block.num_restarts - 1;
        while left < right {
            let mid = (left + right + 1) / 2;
            let region_offset = self.block.restart_point(mid) as usize;
            let mid_key = match self.decode_entry(region_offset) {
                Some((0, non_shared, _, key_start)) => {
                    &self.data[key_start..key_start + non_shared]
                }
                _ => {
                    self.corruption_error(region_offset);
                    return;
                }
            };
            if self.comparator.compare(mid_key, target) == Ordering::Less {
                // Key at "mid" is smaller than target; everything before
                // "mid" is uninteresting
                left = mid;
            } else {
                // Key at "mid" is >= target; everything at or after "mid"
                // is uninteresting
                right = mid - 1;
            }
        }

        // Linear search within the restart block for the first key >= target
        self.seek_to_restart_point(left);
        loop {
            if !self.parse_next_key() {
                return;
            }
            if self.comparator.compare(&self.key, target) != Ordering::Less {
                return;
            }
        }
    }

    fn seek_to_restart_point(&mut self, index: usize) {
        self.key.clear();
        self.restart_index = index;
        // `current` is fixed up by parse_next_key(), which starts reading
        // at the end of the current value
        let offset = self.block.restart_point(index) as usize;
        self.value = (offset, offset);
    }

    /// Decode the entry header at `offset`
    ///
    /// Returns `(shared, non_shared, value_len, key_delta_offset)` if the
    /// header and both payloads fit before the restart array.
    fn decode_entry(&self, offset: usize) -> Option<(usize, usize, usize, usize)> {
        let limit = self.block.restart_offset;
        if offset >= limit {
            return None;
        }
        let mut decoder = Decoder::new(&self.data[offset..limit]);
        let shared = decoder.get_varint32().ok()? as usize;
        let non_shared = decoder.get_varint32().ok()? as usize;
        let value_len = decoder.get_varint32().ok()? as usize;
        if decoder.remaining().len() < non_shared + value_len {
            return None;
        }
        Some((shared, non_shared, value_len, offset + decoder.position()))
    }

    fn parse_next_key(&mut self) -> bool {
        self.current = self.value.1;
        if self.current >= self.block.restart_offset {
            // No more entries to return
            self.mark_exhausted();
            return false;
        }

        match self.decode_entry(self.current) {
            Some((shared, non_shared, value_len, key_start)) if self.key.len() >= shared => {
                self.key.truncate(shared);
                self.key
                    .extend_from_slice(&self.data[key_start..key_start + non_shared]);
                let value_start = key_start + non_shared;
                self.value = (value_start, value_start + value_len);
                while self.restart_index + 1 < self.block.num_restarts
                    && (self.block.restart_point(self.restart_index + 1) as usize) < self.current
                {
                    self.restart_index += 1;
                }
                true
            }
            _ => {
                self.corruption_error(self.current);
                false
            }
        }
    }

    fn mark_exhausted(&mut self) {
        self.current = self.block.restart_offset;
        self.restart_index = self.block.num_restarts;
        self.value = (self.current, self.current);
    }

    fn corruption_error(&mut self, offset: usize) {
        tracing::debug!("Bad entry in block at offset {}", offset);
        self.mark_exhausted();
        self.status = Some(format!("bad entry in block at offset {}", offset));
        self.key.clear();
    }
}

impl<'a> Iterator for BlockIter<'a> {
    /// (key, value) in block order
    type Item = (Vec<u8>, Vec<u8>);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.positioned {
            self.seek_to_first();
        }
        if self.yield_current {
            self.yield_current = false;
        } else if self.valid() {
            self.advance();
        }
        if !self.valid() {
            return None;
        }
        Some((self.key.clone(), self.value().to_vec()))
    }
}
