//! Tests for the Decoder cursor
//!
//! These tests verify:
//! - Sequential decoding of mixed encodings
//! - Malformed input reported as AtlasError::Malformed
//! - Failed reads leaving the cursor where it was

use atlasfmt::coding::{put_fixed32, put_fixed64, put_length_prefixed, put_varint32, put_varint64, Decoder};
use atlasfmt::AtlasError;

// =============================================================================
// Sequential Decoding Tests
// =============================================================================

#[test]
fn test_decode_mixed_sequence() {
    let mut buf = Vec::new();
    put_varint32(&mut buf, 300);
    put_fixed32(&mut buf, 0xdead_beef);
    put_length_prefixed(&mut buf, b"hello");
    put_varint64(&mut buf, u64::MAX);
    put_fixed64(&mut buf, 42);
    buf.extend_from_slice(b"raw");

    let mut decoder = Decoder::new(&buf);
    assert_eq!(decoder.get_varint32().unwrap(), 300);
    assert_eq!(decoder.get_fixed32().unwrap(), 0xdead_beef);
    assert_eq!(decoder.get_length_prefixed().unwrap(), b"hello");
    assert_eq!(decoder.get_varint64().unwrap(), u64::MAX);
    assert_eq!(decoder.get_fixed64().unwrap(), 42);
    assert_eq!(decoder.get_bytes(3).unwrap(), b"raw");

    assert!(decoder.is_empty());
    assert_eq!(decoder.position(), buf.len());
    assert!(decoder.remaining().is_empty());
}

#[test]
fn test_empty_decoder() {
    let decoder = Decoder::new(&[]);
    assert!(decoder.is_empty());
    assert_eq!(decoder.position(), 0);
}

// =============================================================================
// Malformed Input Tests
// =============================================================================

#[test]
fn test_truncated_varint_is_malformed() {
    let buf = [0x05, 0x80, 0x80];
    let mut decoder = Decoder::new(&buf);
    assert_eq!(decoder.get_varint32().unwrap(), 5);

    let err = decoder.get_varint32().unwrap_err();
    assert!(matches!(err, AtlasError::Malformed(_)));
    // Position unchanged after failure
    assert_eq!(decoder.position(), 1);
}

#[test]
fn test_short_fixed_is_malformed() {
    let buf = [1, 2, 3];
    let mut decoder = Decoder::new(&buf);

    assert!(matches!(decoder.get_fixed32(), Err(AtlasError::Malformed(_))));
    assert!(matches!(decoder.get_fixed64(), Err(AtlasError::Malformed(_))));
    assert_eq!(decoder.position(), 0);
    assert_eq!(decoder.remaining(), &buf);
}

#[test]
fn test_length_prefix_past_end_is_malformed() {
    let buf = [10, b'a', b'b'];
    let mut decoder = Decoder::new(&buf);

    assert!(matches!(
        decoder.get_length_prefixed(),
        Err(AtlasError::Malformed(_))
    ));
    assert_eq!(decoder.position(), 0);
}

#[test]
fn test_get_bytes_past_end() {
    let buf = [1, 2, 3, 4];
    let mut decoder = Decoder::new(&buf);
    assert_eq!(decoder.get_bytes(2).unwrap(), &[1, 2]);
    assert!(decoder.get_bytes(3).is_err());
    assert_eq!(decoder.get_bytes(2).unwrap(), &[3, 4]);
    assert!(decoder.is_empty());
}

#[test]
fn test_malformed_error_message_names_offset() {
    let buf = [0x00, 0xff];
    let mut decoder = Decoder::new(&buf);
    decoder.get_varint32().unwrap();

    let message = decoder.get_varint32().unwrap_err().to_string();
    assert!(message.contains("varint32"), "{}", message);
    assert!(message.contains("offset 1"), "{}", message);
}
