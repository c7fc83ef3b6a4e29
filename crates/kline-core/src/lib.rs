//! Core types and traits for the candlestick cache.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Candlestick, BlockMap)
//! - Calendar-aware interval arithmetic (Interval)
//! - Boundary traits for upstream sources and block stores
//! - Error types

pub mod error;
pub mod traits;
pub mod types;

pub use error::{CacheError, CacheResult, ParseIntervalError};
pub use traits::*;
pub use types::*;
