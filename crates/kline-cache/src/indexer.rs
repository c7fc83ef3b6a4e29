//! Timestamp-to-block indexing.

use kline_core::types::Interval;

/// Position of a candlestick within the block partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Index {
    /// Which block the timestamp falls into.
    pub block_number: i64,
    /// Offset of the timestamp within that block.
    pub block_index: u32,
    /// Number of candlesticks per block, as configured for this indexer.
    pub block_size: u32,
}

/// Maps a timestamp to its block coordinates. Pure and deterministic.
pub trait Indexer: Send + Sync {
    fn index(&self, timestamp: i64) -> Index;
}

/// Indexer with a fixed block size shared by every call.
#[derive(Debug, Clone, Copy)]
pub struct FixedBlockIndexer {
    interval: Interval,
    block_size: u32,
}

impl FixedBlockIndexer {
    /// Create an indexer partitioning `interval`-spaced candlesticks into
    /// blocks of `block_size`.
    pub fn new(interval: Interval, block_size: u32) -> Self {
        debug_assert!(block_size > 0);
        Self {
            interval,
            block_size,
        }
    }
}

impl Indexer for FixedBlockIndexer {
    fn index(&self, timestamp: i64) -> Index {
        let n = self.interval.number_since_epoch(timestamp);
        let size = self.block_size as i64;
        Index {
            block_number: n.div_euclid(size),
            block_index: n.rem_euclid(size) as u32,
            block_size: self.block_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: i64) -> i64 {
        (n - 1) * 86_400_000
    }

    #[test]
    fn test_index_daily_blocks() {
        let indexer = FixedBlockIndexer::new("1d".parse().unwrap(), 3);

        assert_eq!(
            indexer.index(day(1)),
            Index {
                block_number: 0,
                block_index: 0,
                block_size: 3
            }
        );
        assert_eq!(
            indexer.index(day(3)),
            Index {
                block_number: 0,
                block_index: 2,
                block_size: 3
            }
        );
        assert_eq!(
            indexer.index(day(4)),
            Index {
                block_number: 1,
                block_index: 0,
                block_size: 3
            }
        );
    }

    #[test]
    fn test_index_mid_interval_timestamp() {
        let indexer = FixedBlockIndexer::new("1d".parse().unwrap(), 3);
        // Two hours into day 5 still indexes as day 5.
        assert_eq!(indexer.index(day(5) + 2 * 3_600_000).block_number, 1);
        assert_eq!(indexer.index(day(5) + 2 * 3_600_000).block_index, 1);
    }

    #[test]
    fn test_index_minutes() {
        let indexer = FixedBlockIndexer::new("5m".parse().unwrap(), 100);
        let n = 512;
        let timestamp = n * 5 * 60_000;
        assert_eq!(
            indexer.index(timestamp),
            Index {
                block_number: 5,
                block_index: 12,
                block_size: 100
            }
        );
    }
}
