//! Base-128 variable-length integers and length-prefixed byte strings

/// Maximum encoded size of a u32 varint
pub const MAX_VARINT32_LEN: usize = 5;

/// Maximum encoded size of a u64 varint
pub const MAX_VARINT64_LEN: usize = 10;

/// Continuation bit
const B: u8 = 0x80;

/// Encode `value` into the front of `dst`, returning the number of bytes written
///
/// # Panics
///
/// Panics if `dst` is shorter than `varint_length(value)`.
/// A buffer of [`MAX_VARINT32_LEN`] bytes is always enough.
#[inline]
pub fn encode_varint32(dst: &mut [u8], value: u32) -> usize {
    encode_varint64(dst, u64::from(value))
}

/// Encode `value` into the front of `dst`, returning the number of bytes written
///
/// # Panics
///
/// Panics if `dst` is shorter than `varint_length(value)`.
/// A buffer of [`MAX_VARINT64_LEN`] bytes is always enough.
#[inline]
pub fn encode_varint64(dst: &mut [u8], mut value: u64) -> usize {
    let mut i = 0;
    while value >= u64::from(B) {
        dst[i] = (value as u8) | B;
        value >>= 7;
        i += 1;
    }
    dst[i] = value as u8;
    i + 1
}

/// Append a varint32 to `dst`
#[inline]
pub fn put_varint32(dst: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; MAX_VARINT32_LEN];
    let n = encode_varint32(&mut buf, value);
    dst.extend_from_slice(&buf[..n]);
}

/// Append a varint64 to `dst`
#[inline]
pub fn put_varint64(dst: &mut Vec<u8>, value: u64) {
    let mut buf = [0u8; MAX_VARINT64_LEN];
    let n = encode_varint64(&mut buf, value);
    dst.extend_from_slice(&buf[..n]);
}

/// Number of bytes the varint encoding of `value` occupies
pub fn varint_length(mut value: u64) -> usize {
    let mut len = 1;
    while value >= u64::from(B) {
        value >>= 7;
        len += 1;
    }
    len
}

/// Decode a varint32 from the front of `src`
///
/// Returns `(value, bytes_consumed)`, or `None` if no terminating byte is
/// found within the first 5 bytes or before `src` ends.
#[inline]
pub fn decode_varint32(src: &[u8]) -> Option<(u32, usize)> {
    // Fast path: single byte
    if let Some(&byte) = src.first() {
        if byte & B == 0 {
            return Some((u32::from(byte), 1));
        }
    }

    let mut result: u32 = 0;
    for (i, &byte) in src.iter().take(MAX_VARINT32_LEN).enumerate() {
        let shift = 7 * i as u32;
        if byte & B != 0 {
            result |= u32::from(byte & 0x7f) << shift;
        } else {
            result |= u32::from(byte) << shift;
            return Some((result, i + 1));
        }
    }
    None
}

/// Decode a varint64 from the front of `src`
///
/// Returns `(value, bytes_consumed)`, or `None` if no terminating byte is
/// found within the first 10 bytes or before `src` ends.
#[inline]
pub fn decode_varint64(src: &[u8]) -> Option<(u64, usize)> {
    let mut result: u64 = 0;
    for (i, &byte) in src.iter().take(MAX_VARINT64_LEN).enumerate() {
        let shift = 7 * i as u32;
        if byte & B != 0 {
            result |= u64::from(byte & 0x7f) << shift;
        } else {
            result |= u64::from(byte) << shift;
            return Some((result, i + 1));
        }
    }
    None
}

/// Append `varint32(value.len())` followed by `value`
pub fn put_length_prefixed(dst: &mut Vec<u8>, value: &[u8]) {
    debug_assert!(value.len() <= u32::MAX as usize);
    put_varint32(dst, value.len() as u32);
    dst.extend_from_slice(value);
}

/// Decode a length-prefixed byte string from the front of `src`
///
/// Returns the string and the total bytes consumed (prefix included), or
/// `None` if the prefix is malformed or the declared length runs past `src`.
pub fn decode_length_prefixed(src: &[u8]) -> Option<(&[u8], usize)> {
    let (len, n) = decode_varint32(src)?;
    let end = n.checked_add(len as usize)?;
    if end > src.len() {
        return None;
    }
    Some((&src[n..end], end))
}
