//! Logging setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Setup logging once at startup. `format` is one of `pretty`, `compact` or
/// `json`; unknown values fall back to `compact`. `RUST_LOG` overrides
/// `level` when set.
pub fn setup_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        "json" => registry.with(fmt::layer().json()).init(),
        "pretty" => registry.with(fmt::layer().pretty()).init(),
        _ => registry.with(fmt::layer().compact()).init(),
    }
}
