//! Tracing subscriber setup.
//!
//! Console output always; a daily rolling file as well when
//! `logging.directory` is configured. `RUST_LOG` overrides the configured
//! filter.

use crate::config::LoggingConfig;
use crate::error::{BridgeError, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` if set and valid, else the configured directives
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.filter).map_err(|e| {
            BridgeError::Config(format!("invalid logging.filter '{}': {}", config.filter, e))
        }),
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(config)?;

    let (file_layer, guard) = match &config.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|e| BridgeError::Config(format!("failed to install logger: {}", e)))?;

    Ok(guard)
}
