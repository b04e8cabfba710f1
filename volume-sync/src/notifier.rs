//! Fan-out of volume changes to subscribers
//!
//! Delivery is fire-and-forget: a failing sink is logged and counted, and
//! the remaining subscribers still get the event.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::event::VolumeEvent;
use crate::subscriber::SubscriberRef;

/// Hands volume events to subscribers and keeps delivery counts
#[derive(Debug, Default)]
pub struct Notifier {
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `volume` to a single subscriber
    ///
    /// Returns whether the sink accepted the event.
    pub(crate) fn notify(&self, subscriber: &SubscriberRef, volume: i32) -> bool {
        match subscriber.deliver(VolumeEvent::new(volume)) {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    subscriber = %subscriber.id(),
                    volume,
                    error = %e,
                    "Volume delivery failed"
                );
                false
            }
        }
    }

    /// Deliver `volume` once to every subscriber
    ///
    /// Returns the number of successful deliveries.
    pub(crate) fn broadcast<'a, I>(&self, subscribers: I, volume: i32) -> usize
    where
        I: IntoIterator<Item = &'a SubscriberRef>,
    {
        subscribers
            .into_iter()
            .filter(|subscriber| self.notify(subscriber, volume))
            .count()
    }

    /// Total successful deliveries
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Total failed deliveries
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}
