//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "klinecache")]
#[command(author, version, about = "Read-through block cache for candlestick series")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (overrides the configured one)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a candlestick window through the cache
    Fetch(FetchArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FetchMode {
    Around,
    Forward,
    Backward,
}

#[derive(clap::Args)]
pub struct FetchArgs {
    /// Symbol to fetch (defaults to the configured one)
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Interval short string, e.g. 1m, 4h, 1d, 1M
    #[arg(short, long)]
    pub interval: Option<String>,

    /// Anchor timestamp (RFC 3339 or Unix milliseconds); defaults to now
    #[arg(short, long)]
    pub at: Option<String>,

    /// Window placement relative to the anchor
    #[arg(short, long, default_value = "around")]
    pub mode: FetchMode,

    /// Run the same fetch N times to exercise the cache
    #[arg(long, default_value = "1")]
    pub repeat: u32,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: String,
}
