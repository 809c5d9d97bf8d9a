//! Log Writer
//!
//! Appends records to a log destination as checksummed physical records.

use std::io;
use std::path::Path;

use crate::coding::encode_fixed32;
use crate::config::SyncStrategy;
use crate::crc;
use crate::error::{AtlasError, Result};
use crate::file::{FileSink, WritableFile};

use super::{record_crc, RecordType, BLOCK_SIZE, HEADER_SIZE};

/// Trailer bytes written when fewer than HEADER_SIZE bytes remain in a block
const ZERO_TRAILER: [u8; HEADER_SIZE - 1] = [0; HEADER_SIZE - 1];

/// Writes records to a log destination
///
/// The writer assumes exclusive ownership of `dest`; one writer per log.
///
/// After any write error the writer is failed: every later `add_record`
/// returns an error without touching `dest`. Recovery means reading the log
/// back and starting a new writer.
pub struct LogWriter<W: WritableFile> {
    /// Durable append target
    dest: W,
    /// Current offset within the active block, always below BLOCK_SIZE
    block_offset: usize,
    /// A write failed; block alignment of `dest` is unknown
    failed: bool,
    /// fsync policy applied after each logical record
    sync_strategy: SyncStrategy,
    /// Logical records written since the last sync
    unsynced_records: usize,
}

impl LogWriter<FileSink> {
    /// Open or create a log file, resuming at its current length
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let (sink, length) = FileSink::open(path)?;
        tracing::debug!(
            "Opened log {} at length {} (block offset {})",
            path.display(),
            length,
            length % BLOCK_SIZE as u64
        );
        Ok(Self::with_offset(sink, length).sync_strategy(sync_strategy))
    }
}

impl<W: WritableFile> LogWriter<W> {
    /// Create a writer appending to an empty `dest`
    pub fn new(dest: W) -> Self {
        Self::with_offset(dest, 0)
    }

    /// Create a writer appending to `dest`, which already holds
    /// `dest_length` bytes of log data
    pub fn with_offset(dest: W, dest_length: u64) -> Self {
        Self {
            dest,
            block_offset: (dest_length % BLOCK_SIZE as u64) as usize,
            sync_strategy: SyncStrategy::Never,
            unsynced_records: 0,
            failed: false,
        }
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.sync_strategy = strategy;
        self
    }

    /// Append one logical record
    ///
    /// On error, bytes already handed to the destination stay there; a reader
    /// treats the incomplete tail as the end of valid data. The writer must
    /// not be used for further records afterwards and rejects them.
    pub fn add_record(&mut self, record: &[u8]) -> Result<()> {
        if self.failed {
            return Err(AtlasError::Io(io::Error::new(
                io::ErrorKind::Other,
                "log writer unusable after an earlier write error",
            )));
        }

        let mut left = record;

        // An empty record still emits a single zero-length Full record
        let mut begin = true;
        loop {
            let leftover = BLOCK_SIZE - self.block_offset;
            if leftover < HEADER_SIZE {
                // Switch to a new block
                if leftover > 0 {
                    tracing::debug!("Padding {} trailing bytes of log block", leftover);
                    if let Err(e) = self.dest.append(&ZERO_TRAILER[..leftover]) {
                        tracing::warn!("Log append failed while padding block: {}", e);
                        self.failed = true;
                        return Err(e.into());
                    }
                }
                self.block_offset = 0;
            }

            // Invariant: we never leave < HEADER_SIZE bytes in a block
            debug_assert!(BLOCK_SIZE - self.block_offset >= HEADER_SIZE);

            let avail = BLOCK_SIZE - self.block_offset - HEADER_SIZE;
            let fragment_length = left.len().min(avail);
            let (fragment, rest) = left.split_at(fragment_length);

            let end = rest.is_empty();
            let record_type = match (begin, end) {
                (true, true) => RecordType::Full,
                (true, false) => RecordType::First,
                (false, true) => RecordType::Last,
                (false, false) => RecordType::Middle,
            };

            self.emit_physical_record(record_type, fragment)?;
            left = rest;
            begin = false;

            if left.is_empty() {
                break;
            }
        }

        self.maybe_sync()
    }

    /// Offset of the next write within the active block, in `0..BLOCK_SIZE`
    pub fn block_offset(&self) -> usize {
        self.block_offset
    }

    /// True once a write error has made the writer unusable
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn get_ref(&self) -> &W {
        &self.dest
    }

    /// Consume the writer, returning the destination
    pub fn into_inner(self) -> W {
        self.dest
    }

    /// Force a sync regardless of strategy
    pub fn sync(&mut self) -> Result<()> {
        self.dest.sync()?;
        self.unsynced_records = 0;
        Ok(())
    }

    fn emit_physical_record(&mut self, record_type: RecordType, payload: &[u8]) -> Result<()> {
        // Must fit in two bytes
        debug_assert!(payload.len() <= 0xffff);
        debug_assert!(self.block_offset + HEADER_SIZE + payload.len() <= BLOCK_SIZE);

        let mut header = [0u8; HEADER_SIZE];
        let crc = crc::mask(record_crc(record_type, payload));
        header[..4].copy_from_slice(&encode_fixed32(crc));
        header[4..6].copy_from_slice(&(payload.len() as u16).to_le_bytes());
        header[6] = record_type as u8;

        let result = self
            .dest
            .append(&header)
            .and_then(|_| self.dest.append(payload))
            .and_then(|_| self.dest.flush());

        if let Err(e) = result {
            // How much of the record reached `dest` is unknown
            tracing::warn!("Log append failed for {:?} record: {}", record_type, e);
            self.failed = true;
            return Err(e.into());
        }

        self.block_offset += HEADER_SIZE + payload.len();
        if self.block_offset == BLOCK_SIZE {
            self.block_offset = 0;
        }

        tracing::trace!(
            "Wrote {:?} record: {} bytes, block offset {}",
            record_type,
            payload.len(),
            self.block_offset
        );
        Ok(())
    }

    fn maybe_sync(&mut self) -> Result<()> {
        self.unsynced_records += 1;
        let due = match self.sync_strategy {
            SyncStrategy::Never => false,
            SyncStrategy::EveryRecord => true,
            SyncStrategy::EveryNRecords { count } => self.unsynced_records >= count,
        };
        if due {
            self.sync()?;
        }
        Ok(())
    }
}
