//! Sync-first volume manager
//!
//! Entry point for UI layers: subscribe observers, nudge the remote's volume
//! up or down, and let the registry keep everyone in sync.

use std::sync::Arc;

use remote_gateway::{CommandSender, Gateway, RemoteCommand};

use crate::config::PollerConfig;
use crate::error::Result;
use crate::poller::{PollerState, PollerStats};
use crate::registry::VolumeRegistry;
use crate::subscriber::Subscriber;

/// Keeps observers informed about a remote device's volume
///
/// Construct one per device connection and hand it to whatever manages
/// observer lifecycles. All methods are blocking.
///
/// # Example
///
/// ```rust,ignore
/// use volume_sync::{Subscriber, VolumeManager};
///
/// let manager = VolumeManager::new(gateway, commands)?;
///
/// let (subscriber, events) = Subscriber::channel();
/// manager.subscribe(&subscriber)?;
///
/// manager.increase_volume()?;
/// if let Some(event) = events.recv_timeout(Duration::from_secs(2)) {
///     println!("Volume: {}", event.volume());
/// }
///
/// manager.unsubscribe(&subscriber);
/// ```
pub struct VolumeManager {
    registry: VolumeRegistry,
    commands: Arc<dyn CommandSender>,
}

impl VolumeManager {
    /// Create a manager with the default poll interval
    pub fn new(gateway: Arc<dyn Gateway>, commands: Arc<dyn CommandSender>) -> Result<Self> {
        Self::with_config(gateway, commands, PollerConfig::default())
    }

    pub fn with_config(
        gateway: Arc<dyn Gateway>,
        commands: Arc<dyn CommandSender>,
        config: PollerConfig,
    ) -> Result<Self> {
        Ok(Self {
            registry: VolumeRegistry::with_config(gateway, config)?,
            commands,
        })
    }

    /// Start delivering volume changes to `subscriber`
    ///
    /// The current volume is delivered before this returns.
    pub fn subscribe(&self, subscriber: &Subscriber) -> Result<()> {
        self.registry.subscribe(subscriber)
    }

    /// Stop delivering to `subscriber`
    ///
    /// Blocks until the poller has exited when this was the last subscriber.
    pub fn unsubscribe(&self, subscriber: &Subscriber) {
        self.registry.unsubscribe(subscriber)
    }

    /// Press volume-up on the remote and poll right away
    pub fn increase_volume(&self) -> Result<()> {
        self.send(RemoteCommand::VolumeUp)
    }

    /// Press volume-down on the remote and poll right away
    pub fn decrease_volume(&self) -> Result<()> {
        self.send(RemoteCommand::VolumeDown)
    }

    fn send(&self, command: RemoteCommand) -> Result<()> {
        self.commands.send(command)?;
        tracing::debug!(%command, "Remote command sent, forcing volume refresh");
        self.registry.force_refresh();
        Ok(())
    }

    /// Poll immediately instead of waiting for the next interval
    pub fn force_refresh(&self) {
        self.registry.force_refresh()
    }

    pub fn last_known_volume(&self) -> i32 {
        self.registry.last_known_volume()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.subscriber_count()
    }

    pub fn is_subscribed(&self, subscriber: &Subscriber) -> bool {
        self.registry.is_subscribed(subscriber)
    }

    pub fn is_polling(&self) -> bool {
        self.registry.is_polling()
    }

    pub fn poller_state(&self) -> Option<PollerState> {
        self.registry.poller_state()
    }

    pub fn poller_stats(&self) -> Option<PollerStats> {
        self.registry.poller_stats()
    }

    pub fn registry(&self) -> &VolumeRegistry {
        &self.registry
    }

    /// Drop all subscribers and stop polling
    ///
    /// Called automatically on drop.
    pub fn shutdown(&self) {
        self.registry.shutdown()
    }
}
