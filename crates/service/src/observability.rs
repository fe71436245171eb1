//! Structured logging setup for the service daemon.

use anyhow::{Result, anyhow};
use tracing::info;

use crate::config::LoggingConfig;

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Fails if a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let fmt_layer = if config.json {
        fmt::layer().json().with_current_span(true).boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;

    info!(
        "Structured logging initialized - level: {}, json: {}",
        config.level, config.json
    );

    Ok(())
}
