//! Configuration for atlasfmt
//!
//! Centralized options with sensible defaults.

use std::fmt;
use std::sync::Arc;

use crate::comparator::{BytewiseComparator, Comparator};
use crate::error::{AtlasError, Result};
use crate::filter::FilterPolicy;

/// Default log2 of the filter segment granularity (2 KiB)
pub const DEFAULT_FILTER_BASE_LG: u8 = 11;

/// Options shared by block builders, filter blocks and log writers
#[derive(Clone)]
pub struct Options {
    // -------------------------------------------------------------------------
    // Block Configuration
    // -------------------------------------------------------------------------
    /// Ordering of keys inside a data block
    pub comparator: Arc<dyn Comparator>,

    /// Approximate size of user data packed per block (in bytes).
    /// The builder never enforces this; callers compare it against
    /// `BlockBuilder::current_size_estimate()` to decide when to cut a block.
    pub block_size: usize,

    /// Number of keys between restart points for delta encoding of keys
    pub block_restart_interval: usize,

    // -------------------------------------------------------------------------
    // Filter Configuration
    // -------------------------------------------------------------------------
    /// Policy used to build filter segments (None disables filter blocks)
    pub filter_policy: Option<Arc<dyn FilterPolicy>>,

    /// A new filter segment is started every 2^filter_base_lg bytes of data
    pub filter_base_lg: u8,

    // -------------------------------------------------------------------------
    // Log Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often the log writer fsyncs its destination
    pub sync_strategy: SyncStrategy,
}

/// Log sync strategy
///
/// Independent of the per-physical-record `flush()`, which always happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Never fsync; leave durability to the OS
    Never,

    /// fsync after every logical record (safest, slowest)
    EveryRecord,

    /// fsync after N logical records (balanced durability/performance)
    EveryNRecords { count: usize },
}

impl Default for Options {
    fn default() -> Self {
        Self {
            comparator: Arc::new(BytewiseComparator),
            block_size: 4 * 1024, // 4 KB
            block_restart_interval: 16,
            filter_policy: None,
            filter_base_lg: DEFAULT_FILTER_BASE_LG,
            sync_strategy: SyncStrategy::Never,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("comparator", &self.comparator.name())
            .field("block_size", &self.block_size)
            .field("block_restart_interval", &self.block_restart_interval)
            .field("filter_policy", &self.filter_policy.as_ref().map(|p| p.name()))
            .field("filter_base_lg", &self.filter_base_lg)
            .field("sync_strategy", &self.sync_strategy)
            .finish()
    }
}

impl Options {
    /// Create a new options builder
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Check the invariants every component relies on
    pub fn validate(&self) -> Result<()> {
        if self.block_restart_interval == 0 {
            return Err(AtlasError::Config(
                "block_restart_interval must be at least 1".to_string(),
            ));
        }
        if self.block_size == 0 {
            return Err(AtlasError::Config("block_size must be non-zero".to_string()));
        }
        if self.filter_base_lg >= 32 {
            return Err(AtlasError::Config(format!(
                "filter_base_lg must be below 32, got {}",
                self.filter_base_lg
            )));
        }
        if let SyncStrategy::EveryNRecords { count: 0 } = self.sync_strategy {
            return Err(AtlasError::Config(
                "EveryNRecords sync strategy needs a non-zero count".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Options
#[derive(Default)]
pub struct OptionsBuilder {
    options: Options,
}

impl OptionsBuilder {
    /// Set the key comparator
    pub fn comparator(mut self, comparator: Arc<dyn Comparator>) -> Self {
        self.options.comparator = comparator;
        self
    }

    /// Set the target data block size (in bytes)
    pub fn block_size(mut self, size: usize) -> Self {
        self.options.block_size = size;
        self
    }

    /// Set the number of entries between restart points
    pub fn block_restart_interval(mut self, interval: usize) -> Self {
        self.options.block_restart_interval = interval;
        self
    }

    /// Set the filter policy
    pub fn filter_policy(mut self, policy: Arc<dyn FilterPolicy>) -> Self {
        self.options.filter_policy = Some(policy);
        self
    }

    /// Set the log2 filter segment granularity
    pub fn filter_base_lg(mut self, base_lg: u8) -> Self {
        self.options.filter_base_lg = base_lg;
        self
    }

    /// Set the log sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.options.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Result<Options> {
        self.options.validate()?;
        Ok(self.options)
    }
}
