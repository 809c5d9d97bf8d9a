//! # atlasfmt
//!
//! The on-disk encoding core of the AtlasKV storage engine:
//! - Varint and fixed-width integer codec shared by every format
//! - Write-ahead log framing into fixed 32 KiB blocks with CRC32C checksums
//! - Prefix-compressed data blocks with a restart-point index
//! - Filter blocks partitioning per-range probabilistic filters
//!
//! ## Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────┐
//!                 │   Application write  │
//!                 └──────────┬───────────┘
//!            ┌───────────────┴───────────────┐
//!            ▼                               ▼
//!   ┌─────────────────┐            ┌──────────────────┐
//!   │    LogWriter    │            │   BlockBuilder   │──── block offsets ───┐
//!   │ (32 KiB blocks) │            │ (restart points) │                      ▼
//!   └────────┬────────┘            └────────┬─────────┘        ┌──────────────────────┐
//!            │                              │                  │  FilterBlockBuilder  │
//!            ▼                              ▼                  └──────────┬───────────┘
//!   ┌─────────────────┐            ┌──────────────────┐                   ▼
//!   │    LogReader    │            │   Block / Iter   │        ┌──────────────────────┐
//!   │   (recovery)    │            │   (read path)    │        │  FilterBlockReader   │
//!   └─────────────────┘            └──────────────────┘        └──────────────────────┘
//!
//!            └──────────── coding (varint / fixed / Decoder) ────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod coding;
pub mod crc;
pub mod file;
pub mod comparator;
pub mod filter;
pub mod log;
pub mod table;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{AtlasError, Result};
pub use config::{Options, SyncStrategy};
pub use comparator::{BytewiseComparator, Comparator};
pub use filter::{BloomFilterPolicy, FilterPolicy};
pub use file::{FileSink, WritableFile};
pub use log::{LogReader, LogWriter};
pub use table::{Block, BlockBuilder, FilterBlockBuilder, FilterBlockReader};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of atlasfmt
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
