//! Decorator-style logging wrappers.
//!
//! Each wrapper implements the same trait as the component it wraps and
//! forwards every call, recording call and return metadata at debug level.
//! Composed at wiring time; the cache core never depends on them.

use async_trait::async_trait;
use tracing::debug;

use kline_cache::CacheIo;
use kline_core::error::{CacheError, CacheResult};
use kline_core::traits::{BlockStore, DataFetcher};
use kline_core::types::{format_timestamp, BlockMap, Candlestick, Interval};

fn range_of(candlesticks: &[Candlestick]) -> String {
    match (candlesticks.first(), candlesticks.last()) {
        (Some(first), Some(last)) => format!(
            "{}: {} - {}",
            candlesticks.len(),
            format_timestamp(first.timestamp),
            format_timestamp(last.timestamp)
        ),
        _ => "0: - ".to_string(),
    }
}

/// Logs calls passing through to a wrapped [`DataFetcher`].
pub struct LoggingDataFetcher<F> {
    name: &'static str,
    inner: F,
}

impl<F: DataFetcher> LoggingDataFetcher<F> {
    pub fn new(name: &'static str, inner: F) -> Self {
        Self { name, inner }
    }

    async fn forward_call<Fut>(
        &self,
        method: &str,
        symbol: &str,
        interval: Interval,
        timestamp: i64,
        call: Fut,
    ) -> Result<Vec<Candlestick>, CacheError>
    where
        Fut: std::future::Future<Output = Result<Vec<Candlestick>, CacheError>>,
    {
        debug!(
            target: "fetcher",
            name = self.name,
            method,
            symbol,
            interval = %interval,
            at = %format_timestamp(timestamp),
            "call"
        );
        let result = call.await;
        match &result {
            Ok(candlesticks) => debug!(
                target: "fetcher",
                name = self.name,
                method,
                symbol,
                interval = %interval,
                range = %range_of(candlesticks),
                "return"
            ),
            Err(error) => debug!(
                target: "fetcher",
                name = self.name,
                method,
                symbol,
                interval = %interval,
                error = %error,
                "error"
            ),
        }
        result
    }
}

#[async_trait]
impl<F: DataFetcher> DataFetcher for LoggingDataFetcher<F> {
    async fn fetch_around(
        &self,
        symbol: &str,
        interval: Interval,
        timestamp: i64,
    ) -> Result<Vec<Candlestick>, CacheError> {
        self.forward_call(
            "fetch_around",
            symbol,
            interval,
            timestamp,
            self.inner.fetch_around(symbol, interval, timestamp),
        )
        .await
    }

    async fn fetch_forward(
        &self,
        symbol: &str,
        interval: Interval,
        timestamp: i64,
    ) -> Result<Vec<Candlestick>, CacheError> {
        self.forward_call(
            "fetch_forward",
            symbol,
            interval,
            timestamp,
            self.inner.fetch_forward(symbol, interval, timestamp),
        )
        .await
    }

    async fn fetch_backward(
        &self,
        symbol: &str,
        interval: Interval,
        timestamp: i64,
    ) -> Result<Vec<Candlestick>, CacheError> {
        self.forward_call(
            "fetch_backward",
            symbol,
            interval,
            timestamp,
            self.inner.fetch_backward(symbol, interval, timestamp),
        )
        .await
    }
}

/// Logs segment shapes passing through a wrapped [`CacheIo`].
pub struct LoggingCacheIo<I> {
    name: &'static str,
    inner: I,
}

impl<I: CacheIo> LoggingCacheIo<I> {
    pub fn new(name: &'static str, inner: I) -> Self {
        Self { name, inner }
    }
}

#[async_trait]
impl<I: CacheIo> CacheIo for LoggingCacheIo<I> {
    async fn load(
        &self,
        from_timestamp: i64,
        to_timestamp: i64,
    ) -> CacheResult<Vec<Vec<Candlestick>>> {
        debug!(
            target: "cache_io",
            name = self.name,
            from = %format_timestamp(from_timestamp),
            to = %format_timestamp(to_timestamp),
            "load"
        );
        let segments = self.inner.load(from_timestamp, to_timestamp).await?;
        let shapes: Vec<String> = segments.iter().map(|s| range_of(s)).collect();
        debug!(
            target: "cache_io",
            name = self.name,
            segments = segments.len(),
            shapes = ?shapes,
            "loaded"
        );
        Ok(segments)
    }

    async fn save(&self, candlesticks: &[Candlestick]) -> CacheResult<()> {
        debug!(
            target: "cache_io",
            name = self.name,
            range = %range_of(candlesticks),
            "save"
        );
        self.inner.save(candlesticks).await
    }
}

/// Logs block numbers passing through a wrapped [`BlockStore`].
pub struct LoggingBlockStore<S> {
    name: &'static str,
    inner: S,
}

impl<S: BlockStore> LoggingBlockStore<S> {
    pub fn new(name: &'static str, inner: S) -> Self {
        Self { name, inner }
    }
}

#[async_trait]
impl<S: BlockStore> BlockStore for LoggingBlockStore<S> {
    async fn load(&self, from_block: i64, to_block: i64) -> Result<BlockMap, CacheError> {
        debug!(
            target: "block_store",
            name = self.name,
            from_block,
            to_block,
            "load"
        );
        let blocks = self.inner.load(from_block, to_block).await?;
        debug!(
            target: "block_store",
            name = self.name,
            present = ?blocks.keys().collect::<Vec<_>>(),
            "loaded"
        );
        Ok(blocks)
    }

    async fn save(&self, blocks: BlockMap) -> Result<(), CacheError> {
        debug!(
            target: "block_store",
            name = self.name,
            numbers = ?blocks.keys().collect::<Vec<_>>(),
            "save"
        );
        self.inner.save(blocks).await
    }
}
