//! Log Reader
//!
//! Reads logical records back out of a log, verifying checksums and
//! reassembling fragments. Used for crash recovery.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::coding::decode_fixed32;
use crate::crc;
use crate::error::Result;

use super::{record_crc, RecordType, BLOCK_SIZE, HEADER_SIZE};

/// Counters describing what a reader skipped
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Number of logical records successfully read
    pub records_read: u64,

    /// Bytes dropped because of detected corruption
    pub dropped_bytes: u64,

    /// Number of corruption events reported
    pub corruptions: u64,

    /// Whether the log ended inside a record (torn write at crash time)
    pub truncated_tail: bool,
}

/// Outcome of parsing one physical record
enum Physical {
    Record { record_type: u8, start: usize, end: usize },
    Eof,
    /// Skipped region; corruption (if any) was already reported
    Bad,
}

/// Reads records from a log source
pub struct LogReader<R: Read> {
    source: R,
    /// Verify CRCs of physical records
    verify_checksums: bool,
    /// Current block contents
    buffer: Vec<u8>,
    /// Read position inside `buffer`
    pos: usize,
    /// Last read returned less than a full block
    eof: bool,
    stats: RecoveryStats,
}

impl LogReader<BufReader<File>> {
    /// Open a log file for reading with checksum verification
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), true))
    }

    /// Read every intact record of the log at `path`
    pub fn recover(path: &Path) -> Result<(Vec<Vec<u8>>, RecoveryStats)> {
        let mut reader = Self::open(path)?;
        let mut records = Vec::new();
        while let Some(record) = reader.read_record()? {
            records.push(record);
        }
        if reader.stats.corruptions > 0 {
            tracing::warn!(
                "Recovered {} records from {} ({} bytes dropped)",
                records.len(),
                path.display(),
                reader.stats.dropped_bytes
            );
        } else {
            tracing::debug!("Recovered {} records from {}", records.len(), path.display());
        }
        Ok((records, reader.stats))
    }
}

impl<R: Read> LogReader<R> {
    pub fn new(source: R, verify_checksums: bool) -> Self {
        Self {
            source,
            verify_checksums,
            buffer: Vec::with_capacity(BLOCK_SIZE),
            pos: 0,
            eof: false,
            stats: RecoveryStats::default(),
        }
    }

    pub fn stats(&self) -> &RecoveryStats {
        &self.stats
    }

    /// Read the next logical record
    ///
    /// Returns `Ok(None)` at the end of the log. Corrupted regions are
    /// skipped and counted in [`stats`](Self::stats).
    pub fn read_record(&mut self) -> Result<Option<Vec<u8>>> {
        let mut scratch = Vec::new();
        let mut in_fragmented_record = false;

        loop {
            match self.read_physical_record()? {
                Physical::Record { record_type, start, end } => {
                    match RecordType::from_u8(record_type) {
                        Some(RecordType::Full) => {
                            if in_fragmented_record && !scratch.is_empty() {
                                self.report(scratch.len(), "partial record without end (1)");
                            }
                            let record = self.buffer[start..end].to_vec();
                            self.stats.records_read += 1;
                            return Ok(Some(record));
                        }
                        Some(RecordType::First) => {
                            if in_fragmented_record && !scratch.is_empty() {
                                self.report(scratch.len(), "partial record without end (2)");
                            }
                            scratch.clear();
                            scratch.extend_from_slice(&self.buffer[start..end]);
                            in_fragmented_record = true;
                        }
                        Some(RecordType::Middle) => {
                            if in_fragmented_record {
                                scratch.extend_from_slice(&self.buffer[start..end]);
                            } else {
                                self.report(end - start, "missing start of fragmented record (1)");
                            }
                        }
                        Some(RecordType::Last) => {
                            if in_fragmented_record {
                                scratch.extend_from_slice(&self.buffer[start..end]);
                                self.stats.records_read += 1;
                                return Ok(Some(scratch));
                            }
                            self.report(end - start, "missing start of fragmented record (2)");
                        }
                        Some(RecordType::Zero) | None => {
                            let dropped = (end - start) + scratch.len();
                            self.report(dropped, &format!("unknown record type {}", record_type));
                            in_fragmented_record = false;
                            scratch.clear();
                        }
                    }
                }
                Physical::Eof => {
                    if in_fragmented_record {
                        // The writer died mid-record; not a corruption
                        self.stats.truncated_tail = true;
                    }
                    return Ok(None);
                }
                Physical::Bad => {
                    if in_fragmented_record {
                        self.report(scratch.len(), "error in middle of record");
                        in_fragmented_record = false;
                        scratch.clear();
                    }
                }
            }
        }
    }

    /// Iterate over the remaining records
    pub fn records(self) -> LogRecords<R> {
        LogRecords { reader: self }
    }

    fn read_physical_record(&mut self) -> Result<Physical> {
        loop {
            let available = self.buffer.len() - self.pos;
            if available < HEADER_SIZE {
                if !self.eof {
                    // Last read was a full block; skip its padding and refill
                    self.fill_block()?;
                    continue;
                }
                // A truncated header at EOF is the writer crashing mid-header
                if available > 0 {
                    self.stats.truncated_tail = true;
                }
                self.buffer.clear();
                self.pos = 0;
                return Ok(Physical::Eof);
            }

            let header = &self.buffer[self.pos..self.pos + HEADER_SIZE];
            let length = usize::from(u16::from_le_bytes([header[4], header[5]]));
            let record_type = header[6];

            if HEADER_SIZE + length > available {
                self.buffer.clear();
                self.pos = 0;
                if !self.eof {
                    self.report(available, "bad record length");
                    return Ok(Physical::Bad);
                }
                // Payload cut short at EOF: the writer died mid-record
                self.stats.truncated_tail = true;
                return Ok(Physical::Eof);
            }

            if record_type == RecordType::Zero as u8 && length == 0 {
                // Preallocated, never-written region; skip without reporting
                self.buffer.clear();
                self.pos = 0;
                return Ok(Physical::Bad);
            }

            let start = self.pos + HEADER_SIZE;
            let end = start + length;

            if self.verify_checksums {
                let expected = crc::unmask(decode_fixed32(header));
                let actual = match RecordType::from_u8(record_type) {
                    Some(t) => record_crc(t, &self.buffer[start..end]),
                    None => crc::extend(crc::value(&[record_type]), &self.buffer[start..end]),
                };
                if actual != expected {
                    // The length itself may be corrupt; drop the rest of the block
                    self.buffer.clear();
                    self.pos = 0;
                    self.report(available, "checksum mismatch");
                    return Ok(Physical::Bad);
                }
            }

            self.pos = end;
            return Ok(Physical::Record { record_type, start, end });
        }
    }

    /// Replace the buffer with the next block of the source
    fn fill_block(&mut self) -> Result<()> {
        self.buffer.clear();
        self.buffer.resize(BLOCK_SIZE, 0);
        self.pos = 0;

        let mut filled = 0;
        while filled < BLOCK_SIZE {
            match self.source.read(&mut self.buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buffer.clear();
                    self.eof = true;
                    return Err(e.into());
                }
            }
        }

        self.buffer.truncate(filled);
        if filled < BLOCK_SIZE {
            self.eof = true;
        }
        Ok(())
    }

    fn report(&mut self, bytes: usize, reason: &str) {
        tracing::warn!("Log corruption: {} ({} bytes dropped)", reason, bytes);
        self.stats.dropped_bytes += bytes as u64;
        self.stats.corruptions += 1;
    }
}

/// Iterator over log records
pub struct LogRecords<R: Read> {
    reader: LogReader<R>,
}

impl<R: Read> LogRecords<R> {
    pub fn stats(&self) -> &RecoveryStats {
        self.reader.stats()
    }
}

impl<R: Read> Iterator for LogRecords<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}
