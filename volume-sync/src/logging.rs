//! Logging setup for applications embedding the volume synchronizer
//!
//! The library itself only emits `tracing` events; this module installs a
//! subscriber for binaries and tests that want to see them.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber installed; events are discarded
    Silent,
    /// Compact stderr output
    Development,
    /// Verbose output with thread ids and source locations
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Install a global tracing subscriber for `mode`
///
/// # Environment Variables
///
/// - `VOLUME_SYNC_LOG_LEVEL`: filter directive (e.g. `volume_sync=debug`)
/// - `RUST_LOG`: used when `VOLUME_SYNC_LOG_LEVEL` is unset
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => Registry::default()
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .compact(),
            )
            .with(env_filter("info"))
            .try_init()
            .map_err(|e| LoggingError::TracingInit(e.to_string())),
        LoggingMode::Debug => Registry::default()
            .with(
                fmt::layer()
                    .pretty()
                    .with_thread_names(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(env_filter("debug"))
            .try_init()
            .map_err(|e| LoggingError::TracingInit(e.to_string())),
    }
}

/// Pick the mode from `VOLUME_SYNC_LOG_MODE` ("development" or "debug")
///
/// Anything else, including an unset variable, means silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    init_logging(mode_from_env(std::env::var("VOLUME_SYNC_LOG_MODE").ok().as_deref()))
}

fn mode_from_env(value: Option<&str>) -> LoggingMode {
    match value {
        Some("development") => LoggingMode::Development,
        Some("debug") => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    if let Ok(level) = std::env::var("VOLUME_SYNC_LOG_LEVEL") {
        EnvFilter::new(level)
    } else if let Ok(rust_log) = std::env::var("RUST_LOG") {
        EnvFilter::new(rust_log)
    } else {
        EnvFilter::new(default_level)
    }
}

/// Whether a global subscriber has been installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
    }

    #[test]
    fn test_mode_from_env() {
        assert_eq!(mode_from_env(Some("debug")), LoggingMode::Debug);
        assert_eq!(mode_from_env(Some("development")), LoggingMode::Development);
        assert_eq!(mode_from_env(Some("loud")), LoggingMode::Silent);
        assert_eq!(mode_from_env(None), LoggingMode::Silent);
    }

    #[test]
    fn test_second_install_is_rejected() {
        // Another test may have installed the subscriber first
        let _ = init_logging(LoggingMode::Development);
        assert!(is_initialized());
        assert!(matches!(
            init_logging(LoggingMode::Debug),
            Err(LoggingError::TracingInit(_))
        ));
    }
}
