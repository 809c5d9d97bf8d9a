//! Tests for the log reader
//!
//! These tests verify:
//! - Round trip of records of every size through memory and files
//! - Torn tails reported as truncation, not corruption
//! - Checksum mismatches dropping the damaged block only
//! - Orphaned fragments and unknown record types being skipped
//! - Preallocated zero regions being ignored

use std::io::Cursor;

use atlasfmt::coding::encode_fixed32;
use atlasfmt::crc;
use atlasfmt::log::{RecordType, BLOCK_SIZE, HEADER_SIZE};
use atlasfmt::{LogReader, LogWriter, SyncStrategy};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn make_payload(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8 ^ seed).collect()
}

/// Encode a log image holding `records`
fn write_log(records: &[Vec<u8>]) -> Vec<u8> {
    let mut writer = LogWriter::new(Vec::new());
    for record in records {
        writer.add_record(record).unwrap();
    }
    writer.into_inner()
}

/// Read every record of `log`
fn read_all(log: Vec<u8>, verify: bool) -> (Vec<Vec<u8>>, atlasfmt::log::RecoveryStats) {
    let mut reader = LogReader::new(Cursor::new(log), verify);
    let mut records = Vec::new();
    while let Some(record) = reader.read_record().unwrap() {
        records.push(record);
    }
    (records, reader.stats().clone())
}

/// Hand-build one physical record with a valid checksum
fn physical(record_type: u8, payload: &[u8]) -> Vec<u8> {
    let checksum = crc::extend(crc::value(&[record_type]), payload);
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&encode_fixed32(crc::mask(checksum)));
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.push(record_type);
    out.extend_from_slice(payload);
    out
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_round_trip_mixed_sizes() {
    let records: Vec<Vec<u8>> = [0, 1, 100, BLOCK_SIZE - HEADER_SIZE, BLOCK_SIZE, 100_000, 6, 0, 3 * BLOCK_SIZE]
        .iter()
        .enumerate()
        .map(|(i, &len)| make_payload(len, i as u8))
        .collect();

    let (read, stats) = read_all(write_log(&records), true);
    assert_eq!(read, records);
    assert_eq!(stats.records_read, records.len() as u64);
    assert_eq!(stats.corruptions, 0);
    assert_eq!(stats.dropped_bytes, 0);
    assert!(!stats.truncated_tail);
}

#[test]
fn test_empty_log() {
    let (read, stats) = read_all(Vec::new(), true);
    assert!(read.is_empty());
    assert_eq!(stats, Default::default());
}

#[test]
fn test_records_iterator() {
    let records = vec![b"one".to_vec(), b"two".to_vec(), make_payload(40_000, 3)];
    let reader = LogReader::new(Cursor::new(write_log(&records)), true);

    let mut iter = reader.records();
    let read: Vec<Vec<u8>> = iter.by_ref().map(|r| r.unwrap()).collect();
    assert_eq!(read, records);
    assert_eq!(iter.stats().records_read, 3);
}

#[test]
fn test_file_round_trip_and_recover() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("000007.log");

    let records: Vec<Vec<u8>> = (0..200).map(|i| make_payload(i * 37, i as u8)).collect();
    {
        let mut writer = LogWriter::open(&path, SyncStrategy::EveryNRecords { count: 50 }).unwrap();
        for record in &records {
            writer.add_record(record).unwrap();
        }
        writer.sync().unwrap();
    }

    let mut reader = LogReader::open(&path).unwrap();
    for expected in &records {
        assert_eq!(reader.read_record().unwrap().as_ref(), Some(expected));
    }
    assert!(reader.read_record().unwrap().is_none());

    let (recovered, stats) = LogReader::recover(&path).unwrap();
    assert_eq!(recovered, records);
    assert_eq!(stats.corruptions, 0);
}

#[test]
fn test_open_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    assert!(LogReader::open(&dir.path().join("missing.log")).is_err());
}

// =============================================================================
// Torn Tail Tests
// =============================================================================

#[test]
fn test_truncated_payload_is_torn_tail() {
    let records = vec![b"first".to_vec(), make_payload(50_000, 1)];
    let mut log = write_log(&records);
    log.truncate(log.len() - 100);

    let (read, stats) = read_all(log, true);
    assert_eq!(read, vec![b"first".to_vec()]);
    assert!(stats.truncated_tail);
    assert_eq!(stats.corruptions, 0);
}

#[test]
fn test_truncated_header_is_torn_tail() {
    let mut log = write_log(&[b"abc".to_vec(), b"defg".to_vec()]);
    log.truncate(HEADER_SIZE + 3 + 3);

    let (read, stats) = read_all(log, true);
    assert_eq!(read, vec![b"abc".to_vec()]);
    assert!(stats.truncated_tail);
    assert_eq!(stats.corruptions, 0);
}

#[test]
fn test_missing_last_fragment_is_torn_tail() {
    let mut log = write_log(&[b"ok".to_vec(), make_payload(2 * BLOCK_SIZE, 2)]);
    // Drop every block after the first
    log.truncate(BLOCK_SIZE);

    let (read, stats) = read_all(log, true);
    assert_eq!(read, vec![b"ok".to_vec()]);
    assert!(stats.truncated_tail);
    assert_eq!(stats.corruptions, 0);
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_checksum_mismatch_drops_block() {
    let records = vec![make_payload(BLOCK_SIZE - HEADER_SIZE, 5), b"tail".to_vec()];
    let mut log = write_log(&records);
    log[HEADER_SIZE + 3] ^= 0x01;

    let (read, stats) = read_all(log, true);
    assert_eq!(read, vec![b"tail".to_vec()]);
    assert_eq!(stats.corruptions, 1);
    assert_eq!(stats.dropped_bytes, BLOCK_SIZE as u64);
    assert!(!stats.truncated_tail);
}

#[test]
fn test_checksum_not_verified_when_disabled() {
    let mut log = write_log(&[b"hello".to_vec()]);
    log[HEADER_SIZE + 4] = b'p';

    let (read, stats) = read_all(log, false);
    assert_eq!(read, vec![b"hellp".to_vec()]);
    assert_eq!(stats.corruptions, 0);
}

#[test]
fn test_corrupt_middle_fragment_skips_record() {
    let records = vec![make_payload(3 * BLOCK_SIZE, 9), b"after".to_vec()];
    let mut log = write_log(&records);
    // Inside the payload of the first Middle fragment
    log[BLOCK_SIZE + HEADER_SIZE + 10] ^= 0xff;

    let (read, stats) = read_all(log, true);
    assert_eq!(read, vec![b"after".to_vec()]);
    assert_eq!(stats.records_read, 1);
    assert!(stats.corruptions >= 1);
    assert!(stats.dropped_bytes >= BLOCK_SIZE as u64);
}

#[test]
fn test_orphan_middle_fragment_is_skipped() {
    let mut log = physical(RecordType::Middle as u8, b"orphan");
    log.extend(physical(RecordType::Full as u8, b"ok"));

    let (read, stats) = read_all(log, true);
    assert_eq!(read, vec![b"ok".to_vec()]);
    assert_eq!(stats.corruptions, 1);
    assert_eq!(stats.dropped_bytes, 6);
}

#[test]
fn test_orphan_last_fragment_is_skipped() {
    let mut log = physical(RecordType::Last as u8, b"tail");
    log.extend(physical(RecordType::Full as u8, b"ok"));

    let (read, stats) = read_all(log, true);
    assert_eq!(read, vec![b"ok".to_vec()]);
    assert_eq!(stats.corruptions, 1);
    assert_eq!(stats.dropped_bytes, 4);
}

#[test]
fn test_first_without_last_then_full() {
    let mut log = physical(RecordType::First as u8, b"partial");
    log.extend(physical(RecordType::Full as u8, b"whole"));

    let (read, stats) = read_all(log, true);
    assert_eq!(read, vec![b"whole".to_vec()]);
    assert_eq!(stats.corruptions, 1);
    assert_eq!(stats.dropped_bytes, 7);
}

#[test]
fn test_unknown_record_type_is_skipped() {
    let mut log = physical(9, b"zzz");
    log.extend(physical(RecordType::Full as u8, b"ok"));

    let (read, stats) = read_all(log, true);
    assert_eq!(read, vec![b"ok".to_vec()]);
    assert_eq!(stats.corruptions, 1);
    assert_eq!(stats.dropped_bytes, 3);
}

#[test]
fn test_zero_region_is_ignored() {
    let (read, stats) = read_all(vec![0u8; 64], true);
    assert!(read.is_empty());
    assert_eq!(stats.corruptions, 0);
    assert!(!stats.truncated_tail);

    let mut log = write_log(&[b"a".to_vec()]);
    log.extend_from_slice(&[0u8; 100]);
    let (read, stats) = read_all(log, true);
    assert_eq!(read, vec![b"a".to_vec()]);
    assert_eq!(stats.corruptions, 0);
}
