//! Log output setup.
//!
//! Production deployments log JSON at `info`; everything else logs
//! human-readable text at `debug`. `RUST_LOG` overrides the level.

use crate::cli::AppConfig;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber, writing to stdout.
pub fn init_logging(config: &AppConfig) {
    let default_level = if config.is_production() { "info" } else { "debug" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dockhand={}", default_level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout);

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = if config.is_production() {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
