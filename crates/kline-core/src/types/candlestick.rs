//! Candlestick (OHLCV) data types.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single OHLCV candlestick.
///
/// Within any sequence produced or consumed by the cache, timestamps are
/// strictly increasing and fall exactly on interval boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candlestick {
    /// Unix timestamp in milliseconds (UTC)
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl Candlestick {
    /// Create a new candlestick.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Get the timestamp as a DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Sparse mapping from block number to a complete, ordered candlestick block.
///
/// Every persisted value holds exactly `block_size` entries in increasing
/// timestamp order; partial blocks are never persisted.
pub type BlockMap = BTreeMap<i64, Vec<Candlestick>>;

/// Format a millisecond timestamp as an ISO 8601 string with milliseconds,
/// e.g. `1970-01-03T00:00:00.000Z`. Used in error messages and logs.
pub fn format_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp_millis(timestamp) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => timestamp.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_conversion() {
        let candle = Candlestick::new(86_400_000, 1.0, 2.0, 0.5, 1.5, 100.0);
        assert_eq!(candle.datetime().to_rfc3339(), "1970-01-02T00:00:00+00:00");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(format_timestamp(2 * 86_400_000), "1970-01-03T00:00:00.000Z");
    }

    #[test]
    fn test_serde_roundtrip() {
        let candle = Candlestick::new(60_000, 20.0, 45.0, 15.0, 40.0, 80.0);
        let json = serde_json::to_string(&candle).unwrap();
        let back: Candlestick = serde_json::from_str(&json).unwrap();
        assert_eq!(back, candle);
    }
}
