//! Fixed-width little-endian integers

/// Encode a u32 as 4 little-endian bytes
#[inline]
pub fn encode_fixed32(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Encode a u64 as 8 little-endian bytes
#[inline]
pub fn encode_fixed64(value: u64) -> [u8; 8] {
    value.to_le_bytes()
}

/// Decode the first 4 bytes of `src` as a little-endian u32
///
/// # Panics
///
/// Panics if `src` is shorter than 4 bytes. Use [`Decoder`](super::Decoder)
/// when the input length is not already known.
#[inline]
pub fn decode_fixed32(src: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&src[..4]);
    u32::from_le_bytes(buf)
}

/// Decode the first 8 bytes of `src` as a little-endian u64
///
/// # Panics
///
/// Panics if `src` is shorter than 8 bytes.
#[inline]
pub fn decode_fixed64(src: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&src[..8]);
    u64::from_le_bytes(buf)
}

/// Append a fixed32 to `dst`
#[inline]
pub fn put_fixed32(dst: &mut Vec<u8>, value: u32) {
    dst.extend_from_slice(&encode_fixed32(value));
}

/// Append a fixed64 to `dst`
#[inline]
pub fn put_fixed64(dst: &mut Vec<u8>, value: u64) {
    dst.extend_from_slice(&encode_fixed64(value));
}
