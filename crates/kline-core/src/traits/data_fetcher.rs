//! Upstream data source trait definition.

use async_trait::async_trait;

use crate::error::CacheError;
use crate::types::{Candlestick, Interval};

/// An upstream market-data source queried in bounded batches.
///
/// Each method returns an ordered, interval-aligned sequence. A source may
/// return fewer candlesticks than its configured batch size; an empty result
/// is a valid "no data" response, not an error. Implementations own their own
/// retry policy; the cache core never retries.
#[async_trait]
pub trait DataFetcher: Send + Sync {
    /// Fetch a batch centered on `timestamp`.
    async fn fetch_around(
        &self,
        symbol: &str,
        interval: Interval,
        timestamp: i64,
    ) -> Result<Vec<Candlestick>, CacheError>;

    /// Fetch a batch starting at `timestamp`.
    async fn fetch_forward(
        &self,
        symbol: &str,
        interval: Interval,
        timestamp: i64,
    ) -> Result<Vec<Candlestick>, CacheError>;

    /// Fetch a batch ending at `timestamp`.
    async fn fetch_backward(
        &self,
        symbol: &str,
        interval: Interval,
        timestamp: i64,
    ) -> Result<Vec<Candlestick>, CacheError>;
}

#[async_trait]
impl<T: DataFetcher + ?Sized> DataFetcher for std::sync::Arc<T> {
    async fn fetch_around(
        &self,
        symbol: &str,
        interval: Interval,
        timestamp: i64,
    ) -> Result<Vec<Candlestick>, CacheError> {
        (**self).fetch_around(symbol, interval, timestamp).await
    }

    async fn fetch_forward(
        &self,
        symbol: &str,
        interval: Interval,
        timestamp: i64,
    ) -> Result<Vec<Candlestick>, CacheError> {
        (**self).fetch_forward(symbol, interval, timestamp).await
    }

    async fn fetch_backward(
        &self,
        symbol: &str,
        interval: Interval,
        timestamp: i64,
    ) -> Result<Vec<Candlestick>, CacheError> {
        (**self).fetch_backward(symbol, interval, timestamp).await
    }
}
