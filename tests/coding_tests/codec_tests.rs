//! Tests for the integer and byte-string codec
//!
//! These tests verify:
//! - Fixed-width little-endian layout and round trips
//! - Varint round trips at every 7-bit boundary
//! - varint_length agreeing with the encoder
//! - Malformed and truncated varints yielding the no-match sentinel
//! - Length-prefixed strings

use atlasfmt::coding::{
    decode_fixed32, decode_fixed64, decode_length_prefixed, decode_varint32, decode_varint64,
    encode_fixed32, encode_fixed64, encode_varint32, encode_varint64, put_fixed32, put_fixed64,
    put_length_prefixed, put_varint32, put_varint64, varint_length, MAX_VARINT32_LEN,
    MAX_VARINT64_LEN,
};

// =============================================================================
// Helper Functions
// =============================================================================

/// Values around every power of two that fits in a u64
fn interesting_u64s() -> Vec<u64> {
    let mut values = vec![0, 100, u64::MAX, u64::MAX - 1];
    for power in 0..64u32 {
        let v = 1u64 << power;
        values.push(v - 1);
        values.push(v);
        values.push(v + 1);
    }
    values
}

// =============================================================================
// Fixed-width Tests
// =============================================================================

#[test]
fn test_fixed32_is_little_endian() {
    assert_eq!(encode_fixed32(0x0403_0201), [0x01, 0x02, 0x03, 0x04]);
    assert_eq!(decode_fixed32(&[0x01, 0x02, 0x03, 0x04]), 0x0403_0201);
}

#[test]
fn test_fixed64_is_little_endian() {
    assert_eq!(
        encode_fixed64(0x0807_0605_0403_0201),
        [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]
    );
}

#[test]
fn test_fixed32_round_trip() {
    let mut buf = Vec::new();
    for v in 0..100_000u32 {
        put_fixed32(&mut buf, v);
    }

    for (i, chunk) in buf.chunks(4).enumerate() {
        assert_eq!(decode_fixed32(chunk), i as u32);
    }
}

#[test]
fn test_fixed64_round_trip() {
    let mut buf = Vec::new();
    for power in 0..64u32 {
        let v = 1u64 << power;
        put_fixed64(&mut buf, v - 1);
        put_fixed64(&mut buf, v);
        put_fixed64(&mut buf, v + 1);
    }

    let mut chunks = buf.chunks(8);
    for power in 0..64u32 {
        let v = 1u64 << power;
        assert_eq!(decode_fixed64(chunks.next().unwrap()), v - 1);
        assert_eq!(decode_fixed64(chunks.next().unwrap()), v);
        assert_eq!(decode_fixed64(chunks.next().unwrap()), v + 1);
    }
    assert!(chunks.next().is_none());
}

#[test]
fn test_decode_fixed_ignores_trailing_bytes() {
    assert_eq!(decode_fixed32(&[1, 0, 0, 0, 0xff, 0xff]), 1);
    assert_eq!(decode_fixed64(&[2, 0, 0, 0, 0, 0, 0, 0, 0xff]), 2);
}

// =============================================================================
// Varint Tests
// =============================================================================

#[test]
fn test_varint32_known_encodings() {
    let mut buf = Vec::new();
    put_varint32(&mut buf, 0);
    assert_eq!(buf, [0x00]);

    buf.clear();
    put_varint32(&mut buf, 127);
    assert_eq!(buf, [0x7f]);

    buf.clear();
    put_varint32(&mut buf, 300);
    assert_eq!(buf, [0xac, 0x02]);

    buf.clear();
    put_varint32(&mut buf, u32::MAX);
    assert_eq!(buf, [0xff, 0xff, 0xff, 0xff, 0x0f]);
}

#[test]
fn test_varint32_round_trip() {
    let mut buf = Vec::new();
    for i in 0..(32 * 32) {
        let v = (i / 32) << (i % 32);
        put_varint32(&mut buf, v);
    }

    let mut pos = 0;
    for i in 0..(32 * 32) {
        let expected = (i / 32) << (i % 32);
        let (actual, n) = decode_varint32(&buf[pos..]).expect("valid varint");
        assert_eq!(actual, expected);
        assert_eq!(n, varint_length(u64::from(actual)));
        pos += n;
    }
    assert_eq!(pos, buf.len());
}

#[test]
fn test_varint64_round_trip() {
    let values = interesting_u64s();
    let mut buf = Vec::new();
    for &v in &values {
        put_varint64(&mut buf, v);
    }

    let mut pos = 0;
    for &expected in &values {
        let (actual, n) = decode_varint64(&buf[pos..]).expect("valid varint");
        assert_eq!(actual, expected);
        assert_eq!(n, varint_length(actual));
        pos += n;
    }
    assert_eq!(pos, buf.len());
}

#[test]
fn test_varint_length_boundaries() {
    assert_eq!(varint_length(0), 1);
    assert_eq!(varint_length(127), 1);
    assert_eq!(varint_length(128), 2);
    assert_eq!(varint_length(16_383), 2);
    assert_eq!(varint_length(16_384), 3);
    assert_eq!(varint_length(u64::from(u32::MAX)), MAX_VARINT32_LEN);
    assert_eq!(varint_length(u64::MAX), MAX_VARINT64_LEN);
}

#[test]
fn test_encode_into_exact_buffer() {
    let mut buf = [0u8; 2];
    assert_eq!(encode_varint32(&mut buf, 300), 2);
    assert_eq!(buf, [0xac, 0x02]);

    let mut buf = [0u8; MAX_VARINT64_LEN];
    assert_eq!(encode_varint64(&mut buf, u64::MAX), MAX_VARINT64_LEN);
    assert_eq!(buf[MAX_VARINT64_LEN - 1], 0x01);
}

#[test]
fn test_varint32_overflow() {
    // Five continuation bytes: no terminator within the u32 limit
    let input = [0x81, 0x82, 0x83, 0x84, 0x85, 0x11];
    assert_eq!(decode_varint32(&input), None);
}

#[test]
fn test_varint64_overflow() {
    let input = [0x81, 0x82, 0x83, 0x84, 0x85, 0x81, 0x82, 0x83, 0x84, 0x85, 0x11];
    assert_eq!(decode_varint64(&input), None);
}

#[test]
fn test_varint32_truncation() {
    let large = (1u32 << 31) + 100;
    let mut buf = Vec::new();
    put_varint32(&mut buf, large);

    for len in 0..buf.len() {
        assert_eq!(decode_varint32(&buf[..len]), None, "prefix of {} bytes", len);
    }
    assert_eq!(decode_varint32(&buf), Some((large, buf.len())));
}

#[test]
fn test_varint64_truncation() {
    let large = (1u64 << 63) + 100;
    let mut buf = Vec::new();
    put_varint64(&mut buf, large);

    for len in 0..buf.len() {
        assert_eq!(decode_varint64(&buf[..len]), None, "prefix of {} bytes", len);
    }
    assert_eq!(decode_varint64(&buf), Some((large, buf.len())));
}

#[test]
fn test_decode_empty_input() {
    assert_eq!(decode_varint32(&[]), None);
    assert_eq!(decode_varint64(&[]), None);
    assert_eq!(decode_length_prefixed(&[]), None);
}

// =============================================================================
// Length-prefixed Tests
// =============================================================================

#[test]
fn test_length_prefixed_sequence() {
    let long = vec![b'x'; 200];
    let mut buf = Vec::new();
    put_length_prefixed(&mut buf, b"");
    put_length_prefixed(&mut buf, b"foo");
    put_length_prefixed(&mut buf, b"bar");
    put_length_prefixed(&mut buf, &long);

    let mut pos = 0;
    for expected in [&b""[..], &b"foo"[..], &b"bar"[..], &long[..]] {
        let (slice, n) = decode_length_prefixed(&buf[pos..]).unwrap();
        assert_eq!(slice, expected);
        pos += n;
    }
    assert_eq!(pos, buf.len());
}

#[test]
fn test_length_prefixed_layout() {
    let mut buf = Vec::new();
    put_length_prefixed(&mut buf, b"abc");
    assert_eq!(buf, [3, b'a', b'b', b'c']);
}

#[test]
fn test_length_prefixed_too_long() {
    // Declares 5 bytes, only 3 follow
    let buf = [5, b'a', b'b', b'c'];
    assert_eq!(decode_length_prefixed(&buf), None);
}

#[test]
fn test_length_prefixed_bad_prefix() {
    let buf = [0x80, 0x80];
    assert_eq!(decode_length_prefixed(&buf), None);
}
