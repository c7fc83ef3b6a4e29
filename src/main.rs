//! Candlestick cache CLI application.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use kline_config::load_config;
use kline_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; CLI flags win over the configured values.
    let config = load_config(&cli.config).unwrap_or_default();
    let level = cli
        .log_level
        .map(cli::LogLevel::as_str)
        .unwrap_or(config.logging.level.as_str());
    let format = if cli.json_logs {
        "json"
    } else {
        config.logging.format.as_str()
    };
    setup_logging(level, format);

    // Execute command
    match cli.command {
        Commands::Fetch(args) => cli::commands::fetch::run(args, &cli.config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}
