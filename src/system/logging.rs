//! Logging system initialization
//!
//! Sets up the tracing subscriber from the loaded configuration.

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber based on configuration.
///
/// **Note**: This should be called only once during application startup,
/// after the configuration has been loaded. Later calls fail because a
/// global subscriber is already installed; the error is ignored so that
/// embedding applications and tests can call it freely.
pub fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(config.level.clone());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(true)
        .try_init();
}
