//! Error types for the candlestick cache.

use thiserror::Error;

/// Errors surfaced by the cache core and its collaborators.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A save batch skipped over an index inside a block it was already
    /// filling. The batch is rejected wholesale; nothing is persisted.
    #[error("non-contiguous cache for block {block_number}: received index {received} after index {previous}, reported at {timestamp}")]
    NonContiguousBlock {
        block_number: i64,
        received: u32,
        previous: u32,
        timestamp: String,
    },

    /// The indexer reported two different block sizes for candlesticks of the
    /// same block. Always a configuration or indexer bug.
    #[error("inconsistent indexed block size for block {block_number}: registered block size {registered} is not equal to block size {reported} reported at {timestamp}")]
    InconsistentBlockSize {
        block_number: i64,
        registered: u32,
        reported: u32,
        timestamp: String,
    },

    /// The window was fully uncached and the upstream source returned nothing.
    #[error("empty data range")]
    EmptyDataRange,

    /// Cached coverage of the window has more than one gap. The fetcher
    /// refuses to issue multiple upstream requests for a single call.
    #[error("more than 1 gap in cache results (N={segments} isMissingHead={missing_head} isMissingTail={missing_tail})")]
    MultipleGaps {
        segments: usize,
        missing_head: bool,
        missing_tail: bool,
    },

    #[error("invalid interval: {0}")]
    InvalidInterval(#[from] ParseIntervalError),

    /// Failure raised by the upstream data source, passed through unchanged.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Failure raised by the block store, passed through unchanged.
    #[error("store error: {0}")]
    Store(String),
}

/// Errors from parsing an interval short string such as "5m" or "1M".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseIntervalError {
    #[error("empty interval string")]
    Empty,

    #[error("unknown interval unit `{0}`")]
    UnknownUnit(char),

    #[error("invalid interval amount `{0}`")]
    InvalidAmount(String),

    #[error("interval amount must be positive, got {0}")]
    NonPositiveAmount(i64),
}

/// Result type alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
