//! In-memory block store.

use async_trait::async_trait;
use tokio::sync::Mutex;

use kline_core::error::CacheError;
use kline_core::traits::BlockStore;
use kline_core::types::BlockMap;

/// In-memory [`BlockStore`] backing a single (source, symbol, interval) cache.
///
/// The mutex spans the whole load/save body, so concurrent saves are applied
/// atomically per block and loads observe a consistent snapshot.
#[derive(Default)]
pub struct MemoryBlockStore {
    blocks: Mutex<BlockMap>,
}

impl MemoryBlockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn load(&self, from_block: i64, to_block: i64) -> Result<BlockMap, CacheError> {
        let blocks = self.blocks.lock().await;
        Ok(blocks
            .range(from_block..=to_block)
            .map(|(number, block)| (*number, block.clone()))
            .collect())
    }

    async fn save(&self, incoming: BlockMap) -> Result<(), CacheError> {
        let mut blocks = self.blocks.lock().await;
        for (number, block) in incoming {
            blocks.insert(number, block);
        }
        Ok(())
    }
}
