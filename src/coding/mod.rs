//! Coding Module
//!
//! Integer and byte-string encodings shared by every on-disk structure.
//!
//! ## Encodings
//! ```text
//! fixed32 / fixed64   little-endian, constant width (4 / 8 bytes)
//!
//! varint (base-128)   7 value bits per byte, high bit = "more follows"
//!   300 → ┌──────────┬──────────┐
//!         │ 1010_1100│ 0000_0010│
//!         └──────────┴──────────┘
//!
//! length-prefixed     varint32(len) ‖ bytes
//! ```
//!
//! Free decode functions return `None` as their no-match sentinel and never
//! panic on short input. [`Decoder`] wraps them in a bounds-checked cursor
//! that reports [`AtlasError::Malformed`](crate::AtlasError::Malformed).

mod decoder;
mod fixed;
mod varint;

pub use decoder::Decoder;
pub use fixed::{
    decode_fixed32, decode_fixed64, encode_fixed32, encode_fixed64, put_fixed32, put_fixed64,
};
pub use varint::{
    decode_length_prefixed, decode_varint32, decode_varint64, encode_varint32, encode_varint64,
    put_length_prefixed, put_varint32, put_varint64, varint_length, MAX_VARINT32_LEN,
    MAX_VARINT64_LEN,
};
