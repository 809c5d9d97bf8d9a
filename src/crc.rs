//! CRC32C checksums
//!
//! Castagnoli CRC over the `crc32c` crate, plus the masking transform applied
//! before a checksum is stored next to the data it covers. Computing the CRC
//! of a string that itself contains embedded CRCs is problematic, and
//! zero-filled regions checksum to degenerate values; masking avoids both.

const MASK_DELTA: u32 = 0xa282_ead8;

/// CRC32C of `data`
#[inline]
pub fn value(data: &[u8]) -> u32 {
    crc32c::crc32c(data)
}

/// CRC32C of `A ‖ data`, where `init_crc` is the CRC32C of some string `A`
#[inline]
pub fn extend(init_crc: u32, data: &[u8]) -> u32 {
    crc32c::crc32c_append(init_crc, data)
}

/// Masked representation of `crc`, suitable for storage
#[inline]
pub fn mask(crc: u32) -> u32 {
    crc.rotate_right(15).wrapping_add(MASK_DELTA)
}

/// Inverse of [`mask`]
#[inline]
pub fn unmask(masked_crc: u32) -> u32 {
    masked_crc.wrapping_sub(MASK_DELTA).rotate_left(15)
}
