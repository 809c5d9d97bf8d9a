//! Decoder
//!
//! A bounds-checked read cursor over an immutable byte view.

use crate::error::{AtlasError, Result};

use super::{decode_fixed32, decode_fixed64, decode_length_prefixed, decode_varint32, decode_varint64};

/// Sequential reader over a byte slice
///
/// Every `get_*` either consumes exactly the bytes of the decoded item or
/// fails with [`AtlasError::Malformed`] and leaves the position unchanged.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    /// Create a decoder positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the underlying slice
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn get_varint32(&mut self) -> Result<u32> {
        let (value, n) = decode_varint32(self.remaining())
            .ok_or_else(|| self.malformed("varint32"))?;
        self.pos += n;
        Ok(value)
    }

    pub fn get_varint64(&mut self) -> Result<u64> {
        let (value, n) = decode_varint64(self.remaining())
            .ok_or_else(|| self.malformed("varint64"))?;
        self.pos += n;
        Ok(value)
    }

    pub fn get_fixed32(&mut self) -> Result<u32> {
        let bytes = self.get_bytes(4).map_err(|_| self.malformed("fixed32"))?;
        Ok(decode_fixed32(bytes))
    }

    pub fn get_fixed64(&mut self) -> Result<u64> {
        let bytes = self.get_bytes(8).map_err(|_| self.malformed("fixed64"))?;
        Ok(decode_fixed64(bytes))
    }

    /// Read a `varint32(len) ‖ bytes` string
    pub fn get_length_prefixed(&mut self) -> Result<&'a [u8]> {
        let (bytes, n) = decode_length_prefixed(self.remaining())
            .ok_or_else(|| self.malformed("length-prefixed slice"))?;
        self.pos += n;
        Ok(bytes)
    }

    /// Read exactly `n` raw bytes
    pub fn get_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let rest = self.remaining();
        if n > rest.len() {
            return Err(AtlasError::Malformed(format!(
                "need {} bytes at offset {}, only {} remain",
                n,
                self.pos,
                rest.len()
            )));
        }
        self.pos += n;
        Ok(&rest[..n])
    }

    fn malformed(&self, what: &str) -> AtlasError {
        AtlasError::Malformed(format!("truncated {} at offset {}", what, self.pos))
    }
}
