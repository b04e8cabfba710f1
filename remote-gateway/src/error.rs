//! Error types for remote gateway operations

use thiserror::Error;

/// Errors that can occur while talking to the remote device
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The gateway could not be obtained (e.g. network not ready)
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),

    /// An established connection to the device was lost
    #[error("Connectivity lost: {0}")]
    ConnectivityLost(String),

    /// The device answered but the volume could not be read
    #[error("Volume query failed: {0}")]
    Query(String),

    /// A remote command could not be sent
    #[error("Command failed: {0}")]
    Command(String),
}

impl GatewayError {
    /// Whether the held connection should be considered dead
    ///
    /// `Unavailable` counts as well: a handle that reports the gateway as
    /// unavailable mid-session is no better than a lost one.
    pub fn is_connectivity_lost(&self) -> bool {
        matches!(self, GatewayError::ConnectivityLost(_) | GatewayError::Unavailable(_))
    }
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(GatewayError::ConnectivityLost("wifi off".into()), true)]
    #[case(GatewayError::Unavailable("no route".into()), true)]
    #[case(GatewayError::Query("bad response".into()), false)]
    #[case(GatewayError::Command("rejected".into()), false)]
    fn test_connectivity_classification(#[case] error: GatewayError, #[case] expected: bool) {
        assert_eq!(error.is_connectivity_lost(), expected);
    }

    #[test]
    fn test_error_display() {
        let error = GatewayError::Query("timeout".to_string());
        assert_eq!(error.to_string(), "Volume query failed: timeout");
    }
}
