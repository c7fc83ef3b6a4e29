//! Fetch command implementation.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::info;

use kline_cache::{BlockIo, CachingFetcher, FixedBlockIndexer};
use kline_config::load_config;
use kline_core::traits::DataFetcher;
use kline_core::types::{format_timestamp, Candlestick, Interval};
use kline_monitor::{LoggingBlockStore, LoggingCacheIo, LoggingDataFetcher};
use kline_store::{MemoryBlockStore, SyntheticDataFetcher};

use crate::cli::{FetchArgs, FetchMode};

pub async fn run(args: FetchArgs, config_path: &Path) -> Result<()> {
    let config = load_config(config_path).context("Failed to load configuration")?;

    let symbol = args.symbol.unwrap_or(config.cache.symbol);
    let interval: Interval = match &args.interval {
        Some(text) => text.parse().context("Invalid interval")?,
        None => config.cache.interval,
    };
    let at = match &args.at {
        Some(text) => parse_timestamp(text)?,
        None => Utc::now().timestamp_millis(),
    };

    info!(
        symbol,
        interval = %interval,
        at = %format_timestamp(at),
        "fetching through the cache"
    );

    // Wire the cache against the synthetic source and an in-memory store.
    let upstream = LoggingDataFetcher::new(
        "synthetic",
        SyntheticDataFetcher::new(config.cache.request_limit),
    );
    let store = LoggingBlockStore::new("memory", MemoryBlockStore::new());
    let indexer = FixedBlockIndexer::new(interval, config.cache.block_size);
    let io = LoggingCacheIo::new("blocks", BlockIo::new(indexer, store));
    let cache = CachingFetcher::new(upstream, io, config.cache.request_limit);

    for round in 1..=args.repeat.max(1) {
        let candlesticks = match args.mode {
            FetchMode::Around => cache.fetch_around(&symbol, interval, at).await?,
            FetchMode::Forward => cache.fetch_forward(&symbol, interval, at).await?,
            FetchMode::Backward => cache.fetch_backward(&symbol, interval, at).await?,
        };

        if args.repeat > 1 {
            println!("--- fetch {} of {} ---", round, args.repeat);
        }
        match args.output.as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(&candlesticks)?),
            _ => print_table(&candlesticks),
        }
    }

    Ok(())
}

fn parse_timestamp(text: &str) -> Result<i64> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Ok(datetime.with_timezone(&Utc).timestamp_millis());
    }
    text.parse::<i64>()
        .with_context(|| format!("'{}' is neither RFC 3339 nor Unix milliseconds", text))
}

fn print_table(candlesticks: &[Candlestick]) {
    println!(
        "{:<26} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "Timestamp", "Open", "High", "Low", "Close", "Volume"
    );
    println!("{}", "-".repeat(92));
    for candlestick in candlesticks {
        println!(
            "{:<26} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.2}",
            format_timestamp(candlestick.timestamp),
            candlestick.open,
            candlestick.high,
            candlestick.low,
            candlestick.close,
            candlestick.volume
        );
    }
    println!("{} candlesticks", candlesticks.len());
}
