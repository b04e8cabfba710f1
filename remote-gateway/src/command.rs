//! Remote commands understood by the device's button interface

use serde::Serialize;

/// A button press sent to the remote device
///
/// Serializes to its button name, the form the device's key API expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RemoteCommand {
    /// Raise the volume by one device step
    #[serde(rename = "volume_plus")]
    VolumeUp,
    /// Lower the volume by one device step
    #[serde(rename = "volume_minus")]
    VolumeDown,
}

impl RemoteCommand {
    /// Button name on the device's remote keymap
    pub fn button_name(&self) -> &'static str {
        match self {
            RemoteCommand::VolumeUp => "volume_plus",
            RemoteCommand::VolumeDown => "volume_minus",
        }
    }

    /// Keymap the button belongs to
    pub fn keymap(&self) -> &'static str {
        "R1"
    }
}

impl std::fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.keymap(), self.button_name())
    }
}
