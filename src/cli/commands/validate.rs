//! Validate configuration command.

use anyhow::Result;
use kline_config::load_config;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    match load_config(config_path) {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Log format: {}", config.logging.format);
            println!("Symbol: {}", config.cache.symbol);
            println!("Interval: {}", config.cache.interval);
            println!("Block size: {}", config.cache.block_size);
            println!("Request limit: {}", config.cache.request_limit);
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
