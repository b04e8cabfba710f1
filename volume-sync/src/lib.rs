//! # Volume Sync
//!
//! Keeps any number of observers informed about a remote device's volume
//! while only polling the device when somebody is listening.
//!
//! ## Overview
//!
//! - **Demand-driven polling**: the first subscriber starts a background
//!   poller thread, the last unsubscribe stops and joins it
//! - **Immediate replay**: a new subscriber receives the last known volume
//!   inside `subscribe`, before any poll
//! - **Force refresh**: volume commands wake the poller at once instead of
//!   waiting for the next interval
//! - **Self-healing**: gateway outages are retried every cycle and never
//!   reach subscribers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use volume_sync::{Subscriber, VolumeManager};
//!
//! let manager = VolumeManager::new(Arc::new(gateway), Arc::new(commands))?;
//!
//! let (subscriber, events) = Subscriber::channel();
//! manager.subscribe(&subscriber)?;   // delivers the current volume
//!
//! manager.increase_volume()?;        // sends the command, polls right away
//! for event in events.timeout_iter(Duration::from_secs(1)) {
//!     println!("Volume: {}", event.volume());
//! }
//!
//! manager.unsubscribe(&subscriber);  // last one out stops the poller
//! ```
//!
//! ## Architecture
//!
//! ```text
//! subscribe ──► VolumeRegistry ──(first)──► Poller thread ──► Gateway
//!                   ▲   │                        │
//!                   │   └──► Notifier ──► sinks  │
//!                   └──── report_change ◄────────┘
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod manager;
pub mod notifier;
pub mod poller;
pub mod receiver;
pub mod registry;
pub mod subscriber;

pub use config::PollerConfig;
pub use error::{DeliveryError, Result, VolumeSyncError};
pub use event::{VolumeEvent, VolumePayload, VOLUME_CHANGED};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use manager::VolumeManager;
pub use notifier::Notifier;
pub use poller::{ChangeSink, Poller, PollerSignal, PollerState, PollerStats};
pub use receiver::VolumeReceiver;
pub use registry::VolumeRegistry;
pub use subscriber::{EventSink, Subscriber, SubscriberId};

// Re-export the collaborator interfaces
pub use remote_gateway::{CommandSender, Gateway, GatewayError, RemoteCommand, VolumeQuery};

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::{
        CommandSender, EventSink, Gateway, GatewayError, PollerConfig, RemoteCommand, Result,
        Subscriber, VolumeEvent, VolumeManager, VolumeQuery, VolumeReceiver, VolumeRegistry,
        VolumeSyncError,
    };
}
