//! Volume change events handed to subscribers

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Event code identifying a volume change among the host's other
/// asynchronous message types
pub const VOLUME_CHANGED: u32 = 700;

/// Payload carried by a volume change event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumePayload {
    pub volume: i32,
}

/// A volume change delivered to one subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeEvent {
    /// Always [`VOLUME_CHANGED`]
    pub code: u32,
    pub payload: VolumePayload,
    /// When the event was created
    pub timestamp: Instant,
}

impl VolumeEvent {
    pub fn new(volume: i32) -> Self {
        Self {
            code: VOLUME_CHANGED,
            payload: VolumePayload { volume },
            timestamp: Instant::now(),
        }
    }

    /// The volume this event reports
    pub fn volume(&self) -> i32 {
        self.payload.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_carries_volume_changed_code() {
        let event = VolumeEvent::new(31);
        assert_eq!(event.code, VOLUME_CHANGED);
        assert_eq!(event.volume(), 31);
    }

    #[test]
    fn test_payload_shape() {
        let event = VolumeEvent::new(30);
        let json = serde_json::to_value(event.payload).unwrap();
        assert_eq!(json, serde_json::json!({ "volume": 30 }));

        let parsed: VolumePayload = serde_json::from_str(r#"{"volume":-5}"#).unwrap();
        assert_eq!(parsed.volume, -5);
    }
}
