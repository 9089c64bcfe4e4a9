//! `tracing` subscriber setup
//!
//! `RUST_LOG` wins over the configured level so operators can raise
//! verbosity without touching config files.

use contact_importer_domain::{ImporterError, LogFormat, LoggingConfig, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter from `RUST_LOG`, falling back to `config.level`.
///
/// # Errors
/// Returns `ImporterError::Config` if the configured directive is invalid.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            ImporterError::Config(format!("Invalid log level '{}': {e}", config.level))
        }),
    }
}

/// Install the global subscriber.
///
/// # Errors
/// Returns `ImporterError::Config` if the filter is invalid or a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .try_init(),
    };

    result.map_err(|e| ImporterError::Config(format!("Failed to install log subscriber: {e}")))?;
    tracing::debug!(format = ?config.format, "Logging initialized");
    Ok(())
}
