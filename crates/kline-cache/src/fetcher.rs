//! Gap-filling fetch orchestrator.
//!
//! Reconciles cached coverage of a requested window against the window
//! itself, issues at most one upstream request per call for the missing
//! portion, persists what it fetched, and returns the exact trimmed window.

use async_trait::async_trait;
use tracing::debug;

use kline_core::error::{CacheError, CacheResult};
use kline_core::traits::DataFetcher;
use kline_core::types::{Candlestick, Interval};

/// Internal seam between the fetcher and the block I/O layer.
///
/// `load` returns the cached coverage of a timestamp window as maximal
/// contiguous segments; `save` persists a flat ordered run.
#[async_trait]
pub trait CacheIo: Send + Sync {
    async fn load(
        &self,
        from_timestamp: i64,
        to_timestamp: i64,
    ) -> CacheResult<Vec<Vec<Candlestick>>>;

    async fn save(&self, candlesticks: &[Candlestick]) -> CacheResult<()>;
}

#[async_trait]
impl<T: CacheIo + ?Sized> CacheIo for std::sync::Arc<T> {
    async fn load(
        &self,
        from_timestamp: i64,
        to_timestamp: i64,
    ) -> CacheResult<Vec<Vec<Candlestick>>> {
        (**self).load(from_timestamp, to_timestamp).await
    }

    async fn save(&self, candlesticks: &[Candlestick]) -> CacheResult<()> {
        (**self).save(candlesticks).await
    }
}

#[derive(Debug, Clone, Copy)]
enum FetchMode {
    Around,
    Forward,
    Backward,
}

/// Read-through cache over an upstream [`DataFetcher`].
///
/// `limit` is the interval-agnostic candlestick count a request window spans.
/// Implements [`DataFetcher`] itself, so cache layers and decorators compose.
pub struct CachingFetcher<F, I> {
    data_fetcher: F,
    io: I,
    around_forward_limit: i64,
    around_backward_limit: i64,
    forward_limit: i64,
    backward_limit: i64,
}

impl<F: DataFetcher, I: CacheIo> CachingFetcher<F, I> {
    /// Create a caching fetcher with windows spanning `limit` candlesticks.
    pub fn new(data_fetcher: F, io: I, limit: u32) -> Self {
        debug_assert!(limit >= 1);
        let limit = limit as i64;
        Self {
            data_fetcher,
            io,
            // round((limit - 1) / 2): on an even split the extra candlestick
            // goes to the forward side.
            around_forward_limit: limit / 2,
            around_backward_limit: (limit - 1) / 2,
            forward_limit: limit - 1,
            backward_limit: limit - 1,
        }
    }

    /// Resolve the window and reconcile it against the cache.
    async fn fetch_window(
        &self,
        mode: FetchMode,
        symbol: &str,
        interval: Interval,
        from_timestamp: i64,
        to_timestamp: i64,
    ) -> CacheResult<Vec<Candlestick>> {
        let mut segments: Vec<Vec<Candlestick>> = self
            .io
            .load(from_timestamp, to_timestamp)
            .await?
            .into_iter()
            .filter(|segment| !segment.is_empty())
            .collect();

        if segments.is_empty() {
            let fetched = self
                .fetch_and_persist(mode, symbol, interval, from_timestamp, to_timestamp)
                .await?;
            if fetched.is_empty() {
                return Err(CacheError::EmptyDataRange);
            }
            return Ok(fetched);
        }

        let first_timestamp = segments[0][0].timestamp;
        let first_segment_end = segments[0][segments[0].len() - 1].timestamp;
        let last_segment = &segments[segments.len() - 1];
        let last_segment_start = last_segment[0].timestamp;
        let last_timestamp = last_segment[last_segment.len() - 1].timestamp;

        let missing_head = first_timestamp > from_timestamp;
        let missing_tail = last_timestamp < to_timestamp;
        let gaps =
            usize::from(missing_head) + usize::from(missing_tail) + (segments.len() - 1);
        debug!(
            symbol,
            interval = %interval,
            segments = segments.len(),
            missing_head,
            missing_tail,
            "classified cache coverage"
        );

        if gaps > 1 {
            return Err(CacheError::MultipleGaps {
                segments: segments.len(),
                missing_head,
                missing_tail,
            });
        }
        if gaps == 0 {
            return Ok(segments.swap_remove(0));
        }

        if missing_head {
            let head_to = interval.subtract_from_timestamp(first_timestamp, 1);
            let mut result = self
                .fetch_and_persist(FetchMode::Backward, symbol, interval, from_timestamp, head_to)
                .await?;
            result.extend(segments.swap_remove(0));
            return Ok(result);
        }
        if missing_tail {
            let tail_from = interval.add_to_timestamp(last_timestamp, 1);
            let tail = self
                .fetch_and_persist(FetchMode::Forward, symbol, interval, tail_from, to_timestamp)
                .await?;
            let mut result = segments.swap_remove(0);
            result.extend(tail);
            return Ok(result);
        }

        // Exactly two segments with the single gap strictly between them.
        let gap_from = interval.add_to_timestamp(first_segment_end, 1);
        let gap_to = interval.subtract_from_timestamp(last_segment_start, 1);
        let middle = self
            .fetch_and_persist(mode, symbol, interval, gap_from, gap_to)
            .await?;
        let mut iter = segments.into_iter();
        let mut result = iter.next().unwrap_or_default();
        let second = iter.next().unwrap_or_default();
        result.extend(middle);
        result.extend(second);
        Ok(result)
    }

    /// Issue the single upstream request for `[from, to]`, persist the result
    /// and trim it to the exact sub-range needed.
    async fn fetch_and_persist(
        &self,
        mode: FetchMode,
        symbol: &str,
        interval: Interval,
        from_timestamp: i64,
        to_timestamp: i64,
    ) -> CacheResult<Vec<Candlestick>> {
        let fetched = match mode {
            FetchMode::Around => {
                let middle = from_timestamp + (to_timestamp - from_timestamp) / 2;
                let candlesticks = self
                    .data_fetcher
                    .fetch_around(symbol, interval, middle)
                    .await?;
                if !candlesticks.is_empty() {
                    self.io.save(&candlesticks).await?;
                }
                candlesticks
            }
            FetchMode::Forward => {
                let candlesticks = self
                    .data_fetcher
                    .fetch_forward(symbol, interval, from_timestamp)
                    .await?;
                self.io.save(&candlesticks).await?;
                candlesticks
            }
            FetchMode::Backward => {
                let candlesticks = self
                    .data_fetcher
                    .fetch_backward(symbol, interval, to_timestamp)
                    .await?;
                self.io.save(&candlesticks).await?;
                candlesticks
            }
        };
        Ok(trim_to_window(fetched, from_timestamp, to_timestamp))
    }
}

#[async_trait]
impl<F: DataFetcher, I: CacheIo> DataFetcher for CachingFetcher<F, I> {
    async fn fetch_around(
        &self,
        symbol: &str,
        interval: Interval,
        timestamp: i64,
    ) -> Result<Vec<Candlestick>, CacheError> {
        let at = ceil_to_boundary(interval, timestamp);
        let from = interval.subtract_from_timestamp(at, self.around_backward_limit);
        let to = interval.add_to_timestamp(at, self.around_forward_limit);
        self.fetch_window(FetchMode::Around, symbol, interval, from, to)
            .await
    }

    async fn fetch_forward(
        &self,
        symbol: &str,
        interval: Interval,
        timestamp: i64,
    ) -> Result<Vec<Candlestick>, CacheError> {
        let from = floor_to_boundary(interval, timestamp);
        let to = interval.add_to_timestamp(from, self.forward_limit);
        self.fetch_window(FetchMode::Forward, symbol, interval, from, to)
            .await
    }

    async fn fetch_backward(
        &self,
        symbol: &str,
        interval: Interval,
        timestamp: i64,
    ) -> Result<Vec<Candlestick>, CacheError> {
        let to = ceil_to_boundary(interval, timestamp);
        let from = interval.subtract_from_timestamp(to, self.backward_limit);
        self.fetch_window(FetchMode::Backward, symbol, interval, from, to)
            .await
    }
}

/// Largest interval boundary at or below `timestamp`.
fn floor_to_boundary(interval: Interval, timestamp: i64) -> i64 {
    interval.timestamp_of(interval.number_since_epoch(timestamp))
}

/// Smallest interval boundary at or above `timestamp`.
fn ceil_to_boundary(interval: Interval, timestamp: i64) -> i64 {
    let boundary = floor_to_boundary(interval, timestamp);
    if boundary < timestamp {
        interval.add_to_timestamp(boundary, 1)
    } else {
        boundary
    }
}

/// Two-pointer trim of an ordered run to `[from, to]`.
fn trim_to_window(candlesticks: Vec<Candlestick>, from: i64, to: i64) -> Vec<Candlestick> {
    if candlesticks.is_empty() {
        return candlesticks;
    }
    let mut head = 0;
    let mut tail = candlesticks.len() - 1;
    while head < tail && candlesticks[head].timestamp < from {
        head += 1;
    }
    while head < tail && candlesticks[tail].timestamp > to {
        tail -= 1;
    }
    candlesticks[head..=tail].to_vec()
}
