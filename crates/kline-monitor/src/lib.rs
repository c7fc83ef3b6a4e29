//! Logging setup and instrumentation wrappers for the candlestick cache.

mod instrument;
mod logging;

pub use instrument::{LoggingBlockStore, LoggingCacheIo, LoggingDataFetcher};
pub use logging::setup_logging;
