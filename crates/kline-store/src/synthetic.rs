//! Deterministic synthetic data source for demos and tests.

use async_trait::async_trait;

use kline_core::error::CacheError;
use kline_core::traits::DataFetcher;
use kline_core::types::{Candlestick, Interval};

// (open, close, low, high) cycled by interval index.
const VALUES: [(f64, f64, f64, f64); 6] = [
    (20.0, 40.0, 15.0, 45.0),
    (40.0, 30.0, 25.0, 50.0),
    (30.0, 40.0, 35.0, 45.0),
    (40.0, 35.0, 30.0, 50.0),
    (35.0, 50.0, 30.0, 55.0),
    (50.0, 20.0, 10.0, 60.0),
];
const VOLUMES: [f64; 3] = [80.0, 120.0, 100.0];

/// Upstream source producing a deterministic series for any symbol.
///
/// The candlestick at interval index `n` is always the same, so repeated
/// fetches over overlapping ranges agree with each other.
pub struct SyntheticDataFetcher {
    around_forward: i64,
    around_backward: i64,
    forward: i64,
    backward: i64,
}

impl SyntheticDataFetcher {
    /// Create a source returning batches of up to `batch_size` candlesticks.
    pub fn new(batch_size: u32) -> Self {
        let batch_size = batch_size as i64;
        Self {
            around_forward: batch_size / 2,
            around_backward: (batch_size - 1) / 2,
            forward: batch_size - 1,
            backward: batch_size - 1,
        }
    }

    fn make(&self, interval: Interval, n: i64) -> Candlestick {
        let (open, close, low, high) = VALUES[n.rem_euclid(VALUES.len() as i64) as usize];
        let volume = VOLUMES[n.rem_euclid(VOLUMES.len() as i64) as usize];
        Candlestick::new(interval.timestamp_of(n), open, high, low, close, volume)
    }

    fn series(&self, interval: Interval, from_n: i64, to_n: i64) -> Vec<Candlestick> {
        (from_n..=to_n).map(|n| self.make(interval, n)).collect()
    }
}

#[async_trait]
impl DataFetcher for SyntheticDataFetcher {
    async fn fetch_around(
        &self,
        _symbol: &str,
        interval: Interval,
        timestamp: i64,
    ) -> Result<Vec<Candlestick>, CacheError> {
        let n = interval.number_since_epoch(timestamp);
        Ok(self.series(interval, n - self.around_backward, n + self.around_forward))
    }

    async fn fetch_forward(
        &self,
        _symbol: &str,
        interval: Interval,
        timestamp: i64,
    ) -> Result<Vec<Candlestick>, CacheError> {
        let n = interval.number_since_epoch(timestamp);
        Ok(self.series(interval, n, n + self.forward))
    }

    async fn fetch_backward(
        &self,
        _symbol: &str,
        interval: Interval,
        timestamp: i64,
    ) -> Result<Vec<Candlestick>, CacheError> {
        let n = interval.number_since_epoch(timestamp);
        Ok(self.series(interval, n - self.backward, n))
    }
}
