//! Block persistence trait definition.

use async_trait::async_trait;

use crate::error::CacheError;
use crate::types::BlockMap;

/// Persistence for complete candlestick blocks, keyed by block number.
///
/// One store instance backs a single logical cache, i.e. one
/// (data source, symbol, interval) tuple. Implementations must apply
/// concurrent `save` calls atomically per block and return a consistent
/// snapshot from `load`; the core itself takes no locks.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Load the blocks in the inclusive `[from_block, to_block]` range.
    /// Missing blocks are simply absent from the result.
    async fn load(&self, from_block: i64, to_block: i64) -> Result<BlockMap, CacheError>;

    /// Upsert whole blocks. A block already present is replaced wholesale.
    async fn save(&self, blocks: BlockMap) -> Result<(), CacheError>;
}

#[async_trait]
impl<T: BlockStore + ?Sized> BlockStore for std::sync::Arc<T> {
    async fn load(&self, from_block: i64, to_block: i64) -> Result<BlockMap, CacheError> {
        (**self).load(from_block, to_block).await
    }

    async fn save(&self, blocks: BlockMap) -> Result<(), CacheError> {
        (**self).save(blocks).await
    }
}
