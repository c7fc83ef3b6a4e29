//! Data types for the candlestick cache.

mod candlestick;
mod interval;

pub use candlestick::{format_timestamp, BlockMap, Candlestick};
pub use interval::{Interval, Unit, EPOCH};
