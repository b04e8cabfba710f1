//! Subscriber handles and the sinks behind them
//!
//! A [`Subscriber`] is owned by whoever wants volume updates. The registry
//! only keeps a [`SubscriberRef`], so dropping every `Subscriber` clone makes
//! further deliveries fail quietly instead of keeping the sink alive.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Weak};

use crate::error::DeliveryError;
use crate::event::VolumeEvent;
use crate::receiver::VolumeReceiver;

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a subscriber; clones of a [`Subscriber`] share it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    fn next() -> Self {
        Self(NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber-{}", self.0)
    }
}

/// Transport that hands an event to an observer
///
/// Implementations must not block and must not call back into the
/// registry: `deliver` runs while the registry lock is held.
pub trait EventSink: Send + Sync + 'static {
    fn deliver(&self, event: VolumeEvent) -> Result<(), DeliveryError>;
}

/// Sink backed by an mpsc channel
struct ChannelSink {
    tx: mpsc::Sender<VolumeEvent>,
}

impl EventSink for ChannelSink {
    fn deliver(&self, event: VolumeEvent) -> Result<(), DeliveryError> {
        self.tx.send(event).map_err(|_| DeliveryError::Disconnected)
    }
}

/// An observer of volume changes
///
/// Equality and hashing go by identity, not by sink contents.
#[derive(Clone)]
pub struct Subscriber {
    id: SubscriberId,
    sink: Arc<dyn EventSink>,
}

impl Subscriber {
    /// Wrap a custom sink
    pub fn new(sink: impl EventSink) -> Self {
        Self {
            id: SubscriberId::next(),
            sink: Arc::new(sink),
        }
    }

    /// Create a subscriber backed by a channel, plus the receiving end
    ///
    /// ```rust,ignore
    /// let (subscriber, events) = Subscriber::channel();
    /// manager.subscribe(&subscriber)?;
    /// for event in events.timeout_iter(Duration::from_secs(2)) {
    ///     println!("volume is now {}", event.volume());
    /// }
    /// ```
    pub fn channel() -> (Self, VolumeReceiver) {
        let (tx, rx) = mpsc::channel();
        (Self::new(ChannelSink { tx }), VolumeReceiver::new(rx))
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn deliver(&self, event: VolumeEvent) -> Result<(), DeliveryError> {
        self.sink.deliver(event)
    }

    /// Non-owning reference for the registry
    pub(crate) fn downgrade(&self) -> SubscriberRef {
        SubscriberRef {
            id: self.id,
            sink: Arc::downgrade(&self.sink),
        }
    }
}

impl PartialEq for Subscriber {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Subscriber {}

impl Hash for Subscriber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.id).finish()
    }
}

/// Registry-side handle that does not keep the sink alive
#[derive(Clone)]
pub(crate) struct SubscriberRef {
    id: SubscriberId,
    sink: Weak<dyn EventSink>,
}

impl SubscriberRef {
    pub(crate) fn id(&self) -> SubscriberId {
        self.id
    }

    pub(crate) fn deliver(&self, event: VolumeEvent) -> Result<(), DeliveryError> {
        match self.sink.upgrade() {
            Some(sink) => sink.deliver(event),
            None => Err(DeliveryError::Disconnected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_equality() {
        let (a, _rx_a) = Subscriber::channel();
        let (b, _rx_b) = Subscriber::channel();

        assert_eq!(a, a.clone());
        assert_ne!(a, b);

        let set: HashSet<Subscriber> = [a.clone(), a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_channel_delivery() {
        let (subscriber, rx) = Subscriber::channel();
        subscriber.deliver(VolumeEvent::new(12)).unwrap();
        assert_eq!(rx.try_recv().map(|e| e.volume()), Some(12));
    }

    #[test]
    fn test_delivery_after_receiver_dropped() {
        let (subscriber, rx) = Subscriber::channel();
        drop(rx);
        assert_eq!(
            subscriber.deliver(VolumeEvent::new(1)),
            Err(DeliveryError::Disconnected)
        );
    }

    #[test]
    fn test_reference_does_not_own_sink() {
        let (subscriber, _rx) = Subscriber::channel();
        let weak = subscriber.downgrade();
        assert_eq!(weak.id(), subscriber.id());
        assert!(weak.deliver(VolumeEvent::new(5)).is_ok());

        drop(subscriber);
        assert_eq!(
            weak.deliver(VolumeEvent::new(6)),
            Err(DeliveryError::Disconnected)
        );
    }

    #[test]
    fn test_ids_increase_and_are_shared_by_clones() {
        let (a, _rx_a) = Subscriber::channel();
        let (b, _rx_b) = Subscriber::channel();

        assert!(b.id().as_u64() > a.id().as_u64());
        assert_eq!(a.clone().id().as_u64(), a.id().as_u64());
        assert_eq!(a.id().to_string(), format!("subscriber-{}", a.id().as_u64()));
    }
}
