//! Configuration for the volume poller
//!
//! Controls how often the remote device is queried and how the
//! background thread behaves.

use std::time::Duration;

use crate::error::VolumeSyncError;

/// Configuration for the background volume poller
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Maximum time between two volume queries
    /// Default: 1000 ms
    pub poll_interval: Duration,

    /// Longest single wait for the registry lock when reporting a change.
    /// The poller re-checks cancellation between attempts.
    /// Default: 50 ms
    pub report_lock_timeout: Duration,

    /// Name given to the poller thread
    /// Default: "volume-poller"
    pub thread_name: String,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            report_lock_timeout: Duration::from_millis(50),
            thread_name: "volume-poller".to_string(),
        }
    }
}

impl PollerConfig {
    /// Create a new PollerConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset for interfaces that want quicker feedback
    pub fn fast() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            report_lock_timeout: Duration::from_millis(20),
            ..Self::default()
        }
    }

    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the per-attempt lock timeout of the report path
    pub fn with_report_lock_timeout(mut self, timeout: Duration) -> Self {
        self.report_lock_timeout = timeout;
        self
    }

    /// Set the poller thread name
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), VolumeSyncError> {
        if self.poll_interval.is_zero() {
            return Err(VolumeSyncError::Configuration(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        if self.report_lock_timeout.is_zero() {
            return Err(VolumeSyncError::Configuration(
                "Report lock timeout must be greater than 0".to_string(),
            ));
        }

        if self.report_lock_timeout >= self.poll_interval {
            return Err(VolumeSyncError::Configuration(
                "Report lock timeout must be shorter than the poll interval".to_string(),
            ));
        }

        if self.thread_name.is_empty() {
            return Err(VolumeSyncError::Configuration(
                "Thread name must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PollerConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(1000));
        assert_eq!(config.thread_name, "volume-poller");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let zero_interval = PollerConfig::new().with_poll_interval(Duration::ZERO);
        assert!(zero_interval.validate().is_err());

        let slow_lock = PollerConfig::new()
            .with_poll_interval(Duration::from_millis(100))
            .with_report_lock_timeout(Duration::from_millis(100));
        assert!(slow_lock.validate().is_err());

        let unnamed = PollerConfig::new().with_thread_name("");
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_builder_pattern() {
        let config = PollerConfig::new()
            .with_poll_interval(Duration::from_millis(500))
            .with_report_lock_timeout(Duration::from_millis(10))
            .with_thread_name("kitchen-volume");

        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.report_lock_timeout, Duration::from_millis(10));
        assert_eq!(config.thread_name, "kitchen-volume");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fast_preset() {
        let fast = PollerConfig::fast();
        assert_eq!(fast.poll_interval, Duration::from_millis(250));
        assert!(fast.validate().is_ok());
    }
}
