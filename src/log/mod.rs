//! Write-Ahead Log (WAL) Module
//!
//! Frames arbitrary-length records into fixed-size blocks for durable,
//! recoverable append-only logging.
//!
//! ## Responsibilities
//! - Fragment records so no physical record crosses a block boundary
//! - CRC32C checksums (masked) over type byte and payload
//! - Zero-pad block tails too small to hold a header
//! - Reassemble records on read, tolerating a torn tail after a crash
//!
//! ## File Format
//! ```text
//! ┌───────────────────────── block (32 KiB) ─────────────────────────┐
//! │ record │ record │ ... │ record │ padding (< 7 bytes of 0x00)      │
//! └──────────────────────────────────────────────────────────────────┘
//!
//! record:
//! ┌───────────┬──────────┬──────────┬──────────────────┐
//! │ CRC (4)   │ Len (2)  │ Type (1) │ Payload (Len)    │
//! └───────────┴──────────┴──────────┴──────────────────┘
//!   masked CRC32C of Type ‖ Payload, little-endian fields
//! ```
//!
//! A logical record fitting in the current block is written as one `Full`
//! record; otherwise as `First`, zero or more `Middle`, and a `Last`.

mod reader;
mod writer;

use std::sync::OnceLock;

use crate::crc;

pub use reader::{LogReader, RecoveryStats};
pub use writer::LogWriter;

/// Size of a log block
pub const BLOCK_SIZE: usize = 32 * 1024;

/// Header size: CRC (4) + Length (2) + Type (1) = 7 bytes
pub const HEADER_SIZE: usize = 4 + 2 + 1;

/// Physical record type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordType {
    /// Reserved for preallocated files
    Zero = 0,

    Full = 1,

    // Fragments
    First = 2,
    Middle = 3,
    Last = 4,
}

/// Largest valid record type tag
pub const MAX_RECORD_TYPE: u8 = RecordType::Last as u8;

impl RecordType {
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Zero),
            1 => Some(Self::Full),
            2 => Some(Self::First),
            3 => Some(Self::Middle),
            4 => Some(Self::Last),
            _ => None,
        }
    }
}

/// CRC32C of each single-byte type tag, the seed for a record's checksum
fn type_crc(record_type: RecordType) -> u32 {
    static TABLE: OnceLock<[u32; MAX_RECORD_TYPE as usize + 1]> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        let mut table = [0u32; MAX_RECORD_TYPE as usize + 1];
        for (tag, slot) in table.iter_mut().enumerate() {
            *slot = crc::value(&[tag as u8]);
        }
        table
    });
    table[record_type as usize]
}

/// Unmasked checksum of a physical record
pub(crate) fn record_crc(record_type: RecordType, payload: &[u8]) -> u32 {
    crc::extend(type_crc(record_type), payload)
}
