//! Block-level cache I/O.
//!
//! Translates between flat candlestick runs and the partitioned block store,
//! enforcing the storage invariants: only complete, contiguous blocks are
//! ever persisted, and reads stitch stored blocks back into maximal
//! contiguous segments.

use async_trait::async_trait;
use tracing::debug;

use kline_core::error::{CacheError, CacheResult};
use kline_core::traits::BlockStore;
use kline_core::types::{format_timestamp, BlockMap, Candlestick};

use crate::fetcher::CacheIo;
use crate::indexer::Indexer;

/// Orchestrates candlestick block loading and saving against a [`BlockStore`].
pub struct BlockIo<I, S> {
    indexer: I,
    store: S,
}

impl<I: Indexer, S: BlockStore> BlockIo<I, S> {
    /// Create a block I/O layer over `store`, partitioned by `indexer`.
    pub fn new(indexer: I, store: S) -> Self {
        Self { indexer, store }
    }

    /// Group an ordered candlestick run into complete blocks.
    ///
    /// A candlestick opening a never-seen block anywhere but at index 0 is a
    /// fragment of a block whose head is not in this batch; it cannot be
    /// attributed to the block start and is dropped. A candlestick landing
    /// inside an accumulating block must continue it exactly where it left
    /// off. The trailing incomplete block is dropped, not persisted partially.
    fn group_into_blocks(&self, candlesticks: &[Candlestick]) -> CacheResult<BlockMap> {
        struct Accumulating {
            block_size: u32,
            candles: Vec<Candlestick>,
        }

        let mut accumulating: Vec<(i64, Accumulating)> = Vec::new();

        for candle in candlesticks {
            let index = self.indexer.index(candle.timestamp);
            match accumulating.iter_mut().find(|(n, _)| *n == index.block_number) {
                None => {
                    if index.block_index != 0 {
                        debug!(
                            block_number = index.block_number,
                            block_index = index.block_index,
                            timestamp = %format_timestamp(candle.timestamp),
                            "dropping headless block fragment"
                        );
                        continue;
                    }
                    accumulating.push((
                        index.block_number,
                        Accumulating {
                            block_size: index.block_size,
                            candles: vec![*candle],
                        },
                    ));
                }
                Some((_, block)) => {
                    if block.block_size != index.block_size {
                        return Err(CacheError::InconsistentBlockSize {
                            block_number: index.block_number,
                            registered: block.block_size,
                            reported: index.block_size,
                            timestamp: format_timestamp(candle.timestamp),
                        });
                    }
                    if index.block_index as usize != block.candles.len() {
                        return Err(CacheError::NonContiguousBlock {
                            block_number: index.block_number,
                            received: index.block_index,
                            previous: block.candles.len() as u32 - 1,
                            timestamp: format_timestamp(candle.timestamp),
                        });
                    }
                    block.candles.push(*candle);
                }
            }
        }

        Ok(accumulating
            .into_iter()
            .filter(|(_, block)| block.candles.len() == block.block_size as usize)
            .map(|(number, block)| (number, block.candles))
            .collect())
    }
}

#[async_trait]
impl<I: Indexer, S: BlockStore> CacheIo for BlockIo<I, S> {
    /// Load the cached coverage of `[from_timestamp, to_timestamp]` as an
    /// ordered list of maximal contiguous segments. A missing block always
    /// terminates a run; missing data is never an error.
    async fn load(
        &self,
        from_timestamp: i64,
        to_timestamp: i64,
    ) -> CacheResult<Vec<Vec<Candlestick>>> {
        let from_block = self.indexer.index(from_timestamp).block_number;
        let to_block = self.indexer.index(to_timestamp).block_number;
        let blocks = self.store.load(from_block, to_block).await?;

        if from_block == to_block {
            let segment: Vec<Candlestick> = blocks
                .get(&from_block)
                .map(|block| {
                    block
                        .iter()
                        .filter(|c| c.timestamp >= from_timestamp && c.timestamp <= to_timestamp)
                        .copied()
                        .collect()
                })
                .unwrap_or_default();
            return Ok(if segment.is_empty() {
                Vec::new()
            } else {
                vec![segment]
            });
        }

        let mut segments: Vec<Vec<Candlestick>> = Vec::new();
        // Current run; starts as the in-range suffix of the first block, or
        // an empty placeholder if that block is absent.
        let mut current: Vec<Candlestick> = match blocks.get(&from_block) {
            Some(block) => {
                let start = block.partition_point(|c| c.timestamp < from_timestamp);
                block[start..].to_vec()
            }
            None => Vec::new(),
        };

        for number in (from_block + 1)..to_block {
            match blocks.get(&number) {
                Some(block) => current.extend(block.iter().copied()),
                None => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                }
            }
        }

        if let Some(block) = blocks.get(&to_block) {
            let end = block.partition_point(|c| c.timestamp <= to_timestamp);
            current.extend(block[..end].iter().copied());
        }
        if !current.is_empty() {
            segments.push(current);
        }

        Ok(segments)
    }

    /// Persist an ordered candlestick run as complete blocks.
    async fn save(&self, candlesticks: &[Candlestick]) -> CacheResult<()> {
        let blocks = self.group_into_blocks(candlesticks)?;
        self.store.save(blocks).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::{FixedBlockIndexer, Index};
    use kline_core::types::Interval;
    use kline_store::MemoryBlockStore;
    use std::sync::Arc;

    fn interval() -> Interval {
        "1d".parse().unwrap()
    }

    fn t(day: i64) -> i64 {
        interval().timestamp_of(day - 1)
    }

    fn c(day: i64) -> Candlestick {
        Candlestick::new(t(day), 0.0, 0.0, 0.0, 0.0, 0.0)
    }

    fn io(store: Arc<MemoryBlockStore>) -> BlockIo<FixedBlockIndexer, Arc<MemoryBlockStore>> {
        BlockIo::new(FixedBlockIndexer::new(interval(), 3), store)
    }

    fn days(candles: &[Candlestick]) -> Vec<i64> {
        candles.iter().map(|c| c.timestamp / 86_400_000 + 1).collect()
    }

    fn segment_days(segments: &[Vec<Candlestick>]) -> Vec<Vec<i64>> {
        segments.iter().map(|s| days(s)).collect()
    }

    async fn persisted(store: &MemoryBlockStore) -> Vec<(i64, Vec<i64>)> {
        store
            .load(0, 100)
            .await
            .unwrap()
            .into_iter()
            .map(|(number, block)| (number, days(&block)))
            .collect()
    }

    #[tokio::test]
    async fn test_save_two_contiguous_blocks_and_load_them() {
        let store = Arc::new(MemoryBlockStore::new());
        let io = io(store.clone());

        io.save(&[1, 2, 3, 4, 5, 6].map(c)).await.unwrap();
        assert_eq!(
            persisted(&store).await,
            vec![(0, vec![1, 2, 3]), (1, vec![4, 5, 6])]
        );

        let segments = io.load(t(1), t(6)).await.unwrap();
        assert_eq!(segment_days(&segments), vec![vec![1, 2, 3, 4, 5, 6]]);
    }

    #[tokio::test]
    async fn test_load_from_the_middle() {
        let store = Arc::new(MemoryBlockStore::new());
        let io = io(store.clone());

        io.save(&[1, 2, 3, 4, 5, 6].map(c)).await.unwrap();
        let segments = io.load(t(2), t(5)).await.unwrap();
        assert_eq!(segment_days(&segments), vec![vec![2, 3, 4, 5]]);
    }

    #[tokio::test]
    async fn test_load_starting_before_first_stored_block() {
        let store = Arc::new(MemoryBlockStore::new());
        let io = io(store.clone());

        io.save(&[4, 5, 6].map(c)).await.unwrap();
        assert_eq!(persisted(&store).await, vec![(1, vec![4, 5, 6])]);

        let segments = io.load(t(1), t(6)).await.unwrap();
        assert_eq!(segment_days(&segments), vec![vec![4, 5, 6]]);
    }

    #[tokio::test]
    async fn test_load_across_a_hole() {
        let store = Arc::new(MemoryBlockStore::new());
        let io = io(store.clone());

        io.save(&[1, 2, 3, 7, 8, 9, 10, 11, 12].map(c)).await.unwrap();
        assert_eq!(
            persisted(&store).await,
            vec![(0, vec![1, 2, 3]), (2, vec![7, 8, 9]), (3, vec![10, 11, 12])]
        );

        let segments = io.load(t(1), t(12)).await.unwrap();
        assert_eq!(
            segment_days(&segments),
            vec![vec![1, 2, 3], vec![7, 8, 9, 10, 11, 12]]
        );
    }

    #[tokio::test]
    async fn test_load_to_mid_interval_timestamp() {
        let store = Arc::new(MemoryBlockStore::new());
        let io = io(store.clone());

        io.save(&[1, 2, 3, 4, 5, 6].map(c)).await.unwrap();
        // Two hours into day 5 cuts the read after day 5.
        let segments = io.load(t(1), t(5) + 2 * 3_600_000).await.unwrap();
        assert_eq!(segment_days(&segments), vec![vec![1, 2, 3, 4, 5]]);
    }

    #[tokio::test]
    async fn test_load_beyond_stored_range() {
        let store = Arc::new(MemoryBlockStore::new());
        let io = io(store.clone());

        io.save(&[1, 2, 3].map(c)).await.unwrap();
        let segments = io.load(t(1), t(9)).await.unwrap();
        assert_eq!(segment_days(&segments), vec![vec![1, 2, 3]]);
    }

    #[tokio::test]
    async fn test_load_within_a_single_block() {
        let store = Arc::new(MemoryBlockStore::new());
        let io = io(store.clone());

        io.save(&[1, 2, 3].map(c)).await.unwrap();
        let segments = io.load(t(1), t(2)).await.unwrap();
        assert_eq!(segment_days(&segments), vec![vec![1, 2]]);
    }

    #[tokio::test]
    async fn test_headless_fragment_dropped_complete_blocks_kept() {
        let store = Arc::new(MemoryBlockStore::new());
        let io = io(store.clone());

        // Days 2 and 3 are a fragment of block 0 whose head is missing.
        io.save(&[2, 3, 4, 5, 6, 7, 8, 9].map(c)).await.unwrap();
        assert_eq!(
            persisted(&store).await,
            vec![(1, vec![4, 5, 6]), (2, vec![7, 8, 9])]
        );
    }

    #[tokio::test]
    async fn test_trailing_partial_block_not_persisted() {
        let store = Arc::new(MemoryBlockStore::new());
        let io = io(store.clone());

        io.save(&[1, 2].map(c)).await.unwrap();
        assert_eq!(persisted(&store).await, vec![]);
    }

    #[tokio::test]
    async fn test_non_contiguous_write_rejected() {
        let store = Arc::new(MemoryBlockStore::new());
        let io = io(store.clone());

        let err = io.save(&[1, 3].map(c)).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "non-contiguous cache for block 0: received index 2 after index 0, \
             reported at 1970-01-03T00:00:00.000Z"
        );
        assert_eq!(persisted(&store).await, vec![]);
    }

    #[tokio::test]
    async fn test_inconsistent_block_size_rejected() {
        struct FlakyIndexer {
            calls: std::sync::atomic::AtomicU32,
        }
        impl Indexer for FlakyIndexer {
            fn index(&self, _timestamp: i64) -> Index {
                let call = self
                    .calls
                    .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Index {
                    block_number: 0,
                    block_index: 0,
                    block_size: if call == 0 { 3 } else { 4 },
                }
            }
        }

        let store = Arc::new(MemoryBlockStore::new());
        let io = BlockIo::new(
            FlakyIndexer {
                calls: std::sync::atomic::AtomicU32::new(0),
            },
            store,
        );
        let err = io.save(&[1, 2].map(c)).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "inconsistent indexed block size for block 0: registered block size 3 \
             is not equal to block size 4 reported at 1970-01-02T00:00:00.000Z"
        );
    }
}
