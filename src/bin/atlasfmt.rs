//! atlasfmt CLI
//!
//! Inspect and produce AtlasKV on-disk structures: append to and dump
//! write-ahead logs, and build data blocks plus a filter block from a
//! key/value listing.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use atlasfmt::{
    AtlasError, Block, BlockBuilder, BloomFilterPolicy, FilterBlockBuilder, FilterBlockReader,
    LogReader, LogWriter, Options, Result, SyncStrategy,
};

/// atlasfmt
#[derive(Parser, Debug)]
#[command(name = "atlasfmt")]
#[command(about = "Tools for AtlasKV log and table formats")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append records to a log file (created if missing)
    LogAppend {
        /// Log file path
        path: PathBuf,

        /// Records to append, one per argument
        records: Vec<String>,

        /// fsync after every record
        #[arg(long)]
        sync: bool,
    },

    /// Print every record of a log file
    LogDump {
        /// Log file path
        path: PathBuf,
    },

    /// Build data blocks and a filter block from `key<TAB>value` lines
    BlockBuild {
        /// Input file, one `key<TAB>value` pair per line
        input: PathBuf,

        /// Entries between restart points
        #[arg(short, long, default_value = "16")]
        restart_interval: usize,

        /// Target data block size in bytes
        #[arg(short, long, default_value = "4096")]
        block_size: usize,

        /// Bloom filter bits per key
        #[arg(long, default_value = "10")]
        bits_per_key: usize,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,atlasfmt=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();
    tracing::debug!("atlasfmt v{}", atlasfmt::VERSION);

    let result = match args.command {
        Commands::LogAppend { path, records, sync } => log_append(&path, &records, sync),
        Commands::LogDump { path } => log_dump(&path),
        Commands::BlockBuild {
            input,
            restart_interval,
            block_size,
            bits_per_key,
        } => block_build(&input, restart_interval, block_size, bits_per_key),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn log_append(path: &Path, records: &[String], sync: bool) -> Result<()> {
    let strategy = if sync {
        SyncStrategy::EveryRecord
    } else {
        SyncStrategy::Never
    };
    let mut writer = LogWriter::open(path, strategy)?;
    for record in records {
        writer.add_record(record.as_bytes())?;
    }
    writer.sync()?;
    tracing::info!("Appended {} records to {}", records.len(), path.display());
    Ok(())
}

fn log_dump(path: &Path) -> Result<()> {
    let mut reader = LogReader::open(path)?;
    let mut index = 0u64;
    while let Some(record) = reader.read_record()? {
        let preview: String = String::from_utf8_lossy(&record).chars().take(64).collect();
        println!("#{:<6} len={:<8} {}", index, record.len(), preview);
        index += 1;
    }

    let stats = reader.stats();
    println!(
        "records={} corruptions={} dropped_bytes={} truncated_tail={}",
        stats.records_read, stats.corruptions, stats.dropped_bytes, stats.truncated_tail
    );
    Ok(())
}

fn block_build(
    input: &Path,
    restart_interval: usize,
    block_size: usize,
    bits_per_key: usize,
) -> Result<()> {
    let policy = Arc::new(BloomFilterPolicy::new(bits_per_key));
    let options = Options::builder()
        .block_restart_interval(restart_interval)
        .block_size(block_size)
        .filter_policy(policy.clone())
        .build()?;

    let text = fs::read_to_string(input)?;
    let mut pairs = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let (key, value) = line.split_once('\t').ok_or_else(|| {
            AtlasError::Malformed(format!("line {}: expected key<TAB>value", lineno + 1))
        })?;
        pairs.push((key.as_bytes().to_vec(), value.as_bytes().to_vec()));
    }
    pairs.sort_by(|a, b| options.comparator.compare(&a.0, &b.0));
    pairs.dedup_by(|a, b| a.0 == b.0);

    let mut builder = BlockBuilder::new(&options);
    let mut filter = FilterBlockBuilder::with_base_lg(policy.clone(), options.filter_base_lg);

    // (offset, size, restart points) of every emitted block
    let mut blocks: Vec<(u64, usize, usize)> = Vec::new();
    let mut offset = 0u64;
    filter.start_block(offset);

    for (key, value) in &pairs {
        builder.add(key, value);
        filter.add_key(key);
        if builder.current_size_estimate() >= options.block_size {
            let (size, restarts) = summarize(builder.finish())?;
            blocks.push((offset, size, restarts));
            offset += size as u64;
            builder.reset();
            filter.start_block(offset);
        }
    }
    if !builder.is_empty() {
        let (size, restarts) = summarize(builder.finish())?;
        blocks.push((offset, size, restarts));
    }

    let filter_block = filter.finish();
    let reader = FilterBlockReader::new(policy.as_ref(), &filter_block);

    for (i, (offset, size, restarts)) in blocks.iter().enumerate() {
        println!(
            "block #{:<4} offset={:<10} size={:<6} restarts={}",
            i, offset, size, restarts
        );
    }
    println!(
        "entries={} blocks={} filter_bytes={} filter_segments={}",
        pairs.len(),
        blocks.len(),
        filter_block.len(),
        reader.num_segments()
    );
    Ok(())
}

/// Size and restart count of a finished block, read back through `Block`
fn summarize(contents: &[u8]) -> Result<(usize, usize)> {
    let block = Block::new(Bytes::copy_from_slice(contents))?;
    Ok((block.size(), block.num_restarts()))
}
