//! Configuration structures.

use kline_core::types::Interval;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cache: CacheSettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "klinecache".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// Cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Candlesticks per persisted block.
    pub block_size: u32,
    /// Candlesticks per fetch window and upstream batch.
    pub request_limit: u32,
    /// Interval used when a command does not specify one.
    pub interval: Interval,
    /// Symbol used when a command does not specify one.
    pub symbol: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            block_size: 100,
            request_limit: 99,
            interval: Interval::default(),
            symbol: "BTC-USDT".to_string(),
        }
    }
}
