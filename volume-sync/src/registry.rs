//! Subscription registry driving the poller lifecycle
//!
//! Subscriber set, last known volume and the poller slot live under one
//! lock. The first subscriber starts a poller, the last one to leave stops
//! and joins it, so a poller runs exactly while somebody is listening.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use remote_gateway::Gateway;

use crate::config::PollerConfig;
use crate::error::Result;
use crate::notifier::Notifier;
use crate::poller::{ChangeSink, Poller, PollerSignal, PollerState, PollerStats};
use crate::subscriber::{Subscriber, SubscriberId, SubscriberRef};

struct RegistryState {
    subscribers: HashMap<SubscriberId, SubscriberRef>,
    last_volume: i32,
    poller: Option<Poller>,
}

impl RegistryState {
    fn apply_change(&mut self, notifier: &Notifier, mirror: &AtomicI32, volume: i32) {
        self.last_volume = volume;
        mirror.store(volume, Ordering::Release);

        let delivered = notifier.broadcast(self.subscribers.values(), volume);
        tracing::debug!(
            volume,
            subscribers = self.subscribers.len(),
            delivered,
            "Volume change broadcast"
        );
    }
}

/// State shared between the registry and its poller thread
struct Shared {
    state: Mutex<RegistryState>,
    /// Lock-free copy of `last_volume` for the poller's comparison
    last_volume: AtomicI32,
    notifier: Notifier,
    report_lock_timeout: Duration,
}

impl ChangeSink for Shared {
    fn last_known_volume(&self) -> i32 {
        self.last_volume.load(Ordering::Acquire)
    }

    fn report_change(&self, volume: i32, signal: &PollerSignal) {
        // unsubscribe() joins the poller while holding the lock, so never
        // wait on it unconditionally from here.
        loop {
            if signal.is_cancelled() {
                tracing::debug!(volume, "Poller cancelled, dropping volume report");
                return;
            }
            if let Some(mut state) = self.state.try_lock_for(self.report_lock_timeout) {
                state.apply_change(&self.notifier, &self.last_volume, volume);
                return;
            }
        }
    }
}

/// Tracks subscribers and owns the poller that serves them
pub struct VolumeRegistry {
    shared: Arc<Shared>,
    gateway: Arc<dyn Gateway>,
    config: PollerConfig,
}

impl VolumeRegistry {
    /// Create a registry polling `gateway` with the default configuration
    pub fn new(gateway: Arc<dyn Gateway>) -> Result<Self> {
        Self::with_config(gateway, PollerConfig::default())
    }

    pub fn with_config(gateway: Arc<dyn Gateway>, config: PollerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(RegistryState {
                    subscribers: HashMap::new(),
                    last_volume: 0,
                    poller: None,
                }),
                last_volume: AtomicI32::new(0),
                notifier: Notifier::new(),
                report_lock_timeout: config.report_lock_timeout,
            }),
            gateway,
            config,
        })
    }

    /// Register a subscriber
    ///
    /// The subscriber immediately receives the last known volume, even if it
    /// was already registered. The first subscriber starts the poller; if the
    /// poller thread cannot be spawned the subscriber is not added.
    pub fn subscribe(&self, subscriber: &Subscriber) -> Result<()> {
        let mut state = self.shared.state.lock();
        let reference = subscriber.downgrade();

        self.shared.notifier.notify(&reference, state.last_volume);

        let first = state.subscribers.is_empty();
        self.ensure_poller(&mut state)?;
        if first {
            tracing::info!(subscriber = %subscriber.id(), "First subscriber, volume polling started");
        }

        if state.subscribers.insert(subscriber.id(), reference).is_none() {
            tracing::debug!(
                subscriber = %subscriber.id(),
                subscribers = state.subscribers.len(),
                "Subscriber added"
            );
        }

        Ok(())
    }

    /// Make sure a live poller occupies the slot
    ///
    /// A poller whose thread has exited on its own (a panicking gateway) is
    /// joined and replaced.
    fn ensure_poller(&self, state: &mut RegistryState) -> Result<()> {
        match state.poller.as_ref().map(Poller::is_running) {
            Some(true) => return Ok(()),
            Some(false) => {
                if let Some(mut dead) = state.poller.take() {
                    dead.stop_and_join();
                }
                tracing::warn!("Volume poller exited unexpectedly, restarting");
            }
            None => {}
        }

        let sink: Arc<dyn ChangeSink> = Arc::clone(&self.shared) as Arc<dyn ChangeSink>;
        let mut poller = Poller::new(self.config.clone(), Arc::clone(&self.gateway), sink);
        poller.start()?;
        state.poller = Some(poller);
        Ok(())
    }

    /// Remove a subscriber
    ///
    /// Removing the last subscriber stops the poller and blocks until its
    /// thread has exited. Unknown subscribers are ignored.
    pub fn unsubscribe(&self, subscriber: &Subscriber) {
        let mut state = self.shared.state.lock();

        if state.subscribers.remove(&subscriber.id()).is_none() {
            tracing::debug!(subscriber = %subscriber.id(), "Unsubscribe for unknown subscriber");
            return;
        }

        tracing::debug!(
            subscriber = %subscriber.id(),
            subscribers = state.subscribers.len(),
            "Subscriber removed"
        );

        if state.subscribers.is_empty() {
            if let Some(mut poller) = state.poller.take() {
                poller.stop_and_join();
            }
            tracing::info!("Last subscriber gone, volume polling stopped");
        }
    }

    /// Record a new volume and deliver it to every subscriber
    pub fn report_change(&self, volume: i32) {
        let mut state = self.shared.state.lock();
        state.apply_change(&self.shared.notifier, &self.shared.last_volume, volume);
    }

    /// Ask the running poller for an immediate poll; no-op when idle
    pub fn force_refresh(&self) {
        let mut state = self.shared.state.lock();
        if state.subscribers.is_empty() {
            return;
        }
        if let Err(e) = self.ensure_poller(&mut state) {
            tracing::warn!(error = %e, "Could not restart volume poller");
            return;
        }
        if let Some(poller) = state.poller.as_ref() {
            poller.force_refresh();
        }
    }

    /// Drop every subscriber and stop the poller
    pub fn shutdown(&self) {
        let mut state = self.shared.state.lock();
        let dropped = state.subscribers.len();
        state.subscribers.clear();

        if let Some(mut poller) = state.poller.take() {
            poller.stop_and_join();
            tracing::info!(subscribers = dropped, "Volume registry shut down");
        }
    }

    pub fn last_known_volume(&self) -> i32 {
        self.shared.state.lock().last_volume
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.state.lock().subscribers.len()
    }

    pub fn is_subscribed(&self, subscriber: &Subscriber) -> bool {
        self.shared
            .state
            .lock()
            .subscribers
            .contains_key(&subscriber.id())
    }

    /// Whether a poller thread is currently running
    pub fn is_polling(&self) -> bool {
        self.shared
            .state
            .lock()
            .poller
            .as_ref()
            .map_or(false, |p| p.is_running())
    }

    pub fn poller_state(&self) -> Option<PollerState> {
        self.shared.state.lock().poller.as_ref().map(|p| p.state())
    }

    pub fn poller_stats(&self) -> Option<PollerStats> {
        self.shared.state.lock().poller.as_ref().map(|p| p.stats())
    }

    /// Deliveries accepted and refused by subscriber sinks so far
    ///
    /// Taken under the registry lock, so no broadcast is half counted.
    pub fn delivery_counts(&self) -> (u64, u64) {
        let _state = self.shared.state.lock();
        (self.shared.notifier.delivered(), self.shared.notifier.failed())
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }
}

impl Drop for VolumeRegistry {
    fn drop(&mut self) {
        tracing::debug!(
            subscribers = self.shared.state.lock().subscribers.len(),
            "VolumeRegistry dropping"
        );
        self.shutdown();
    }
}
