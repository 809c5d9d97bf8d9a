//! Table Module
//!
//! Byte layouts of the structures an SSTable is assembled from.
//!
//! ## Data Block Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ Entry                                                           │
//! │ ┌────────────┬──────────────┬─────────────┬─────────┬─────────┐ │
//! │ │shared (v32)│unshared (v32)│value_len(v32)│key delta│  value  │ │
//! │ └────────────┴──────────────┴─────────────┴─────────┴─────────┘ │
//! │ ... repeated; shared == 0 at every restart point ...            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ Trailer                                                         │
//! │   restarts: fixed32[num_restarts] | num_restarts: fixed32       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Filter Block Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ filter 0 │ filter 1 │ ... │ filter N-1                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ offset of filter 0 .. N-1: fixed32 each                         │
//! │ offset of the offset array: fixed32                             │
//! │ base_lg: u8  (filter i covers block offsets [i<<lg, (i+1)<<lg)) │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod block;
mod block_builder;
mod filter_block;

pub use block::{Block, BlockIter};
pub use block_builder::BlockBuilder;
pub use filter_block::{FilterBlockBuilder, FilterBlockReader};
