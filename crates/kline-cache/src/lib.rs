//! Block-partitioned read-through cache for candlestick series.
//!
//! Sits between a consumer that wants a contiguous candlestick window and an
//! upstream source that is queried in bounded batches: it decides what is
//! already cached, fetches only what is missing, persists new data as
//! complete blocks, and returns an exact gap-free window.

mod block_io;
mod fetcher;
mod indexer;

pub use block_io::BlockIo;
pub use fetcher::{CacheIo, CachingFetcher};
pub use indexer::{FixedBlockIndexer, Index, Indexer};
