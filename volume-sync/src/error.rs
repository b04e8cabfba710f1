use remote_gateway::GatewayError;
use thiserror::Error;

/// Errors that can occur in the volume synchronizer
#[derive(Error, Debug)]
pub enum VolumeSyncError {
    /// Invalid poller configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The OS refused to start the poller thread
    #[error("Failed to spawn poller thread: {0}")]
    PollerSpawn(#[source] std::io::Error),

    /// A poller was started a second time; stopped pollers are not restartable
    #[error("Poller has already been started")]
    AlreadyStarted,

    /// A remote command could not be sent
    #[error("Remote command failed: {0}")]
    Command(#[from] GatewayError),
}

/// Errors a subscriber's sink may report when handed an event
///
/// These never leave the notifier; they are logged and counted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The receiving side is gone
    #[error("Subscriber disconnected")]
    Disconnected,

    /// The sink refused the event
    #[error("Delivery rejected: {0}")]
    Rejected(String),
}

/// Result type for volume synchronizer operations
pub type Result<T> = std::result::Result<T, VolumeSyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_conversion() {
        let error: VolumeSyncError = GatewayError::Command("busy".to_string()).into();
        assert!(matches!(error, VolumeSyncError::Command(_)));
        assert_eq!(error.to_string(), "Remote command failed: Command failed: busy");
    }

    #[test]
    fn test_delivery_error_display() {
        assert_eq!(DeliveryError::Disconnected.to_string(), "Subscriber disconnected");
    }
}
