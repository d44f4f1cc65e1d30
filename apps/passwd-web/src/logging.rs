//! Structured logging setup using tracing.
//!
//! `RUST_LOG` takes precedence over the configured level. Results that need
//! operator attention are emitted on the `passwd::alert` target, so they can
//! be routed separately (e.g. `RUST_LOG=info,passwd::alert=error`).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{AppError, AppResult};

/// Initialize the global tracing subscriber.
pub fn init_logging(config: &LoggingConfig) -> AppResult<()> {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| AppError::Config(format!("Invalid log filter '{}': {e}", config.level)))?;

    let (json_layer, pretty_layer) = match config.format {
        LogFormat::Json => (
            Some(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(true)
                    .with_line_number(true)
                    .flatten_event(true),
            ),
            None,
        ),
        LogFormat::Pretty => (None, Some(fmt::layer().pretty().with_target(true))),
    };

    tracing_subscriber::registry()
        .with(json_layer)
        .with(pretty_layer)
        .with(filter_layer)
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to initialize logging: {e}")))?;

    tracing::info!(level = %config.level, format = ?config.format, "Logging initialized");
    Ok(())
}

/// Initialize logging for tests (with simpler output).
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}
