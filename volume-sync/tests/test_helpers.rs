//! Shared helpers for volume-sync integration tests
//!
//! - `ScriptedGateway`: a device whose volume, outages and query failures
//!   are driven by the test
//! - `SteppingCommands`: a command sender that moves the scripted volume
//! - Timing helpers for waiting on background effects

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use volume_sync::{
    CommandSender, Gateway, GatewayError, PollerConfig, RemoteCommand, VolumeEvent, VolumeQuery,
    VolumeReceiver,
};

/// Fake remote device
#[derive(Default)]
pub struct ScriptedGateway {
    volume: AtomicI32,
    connect_failures_left: AtomicU32,
    query_errors: Mutex<VecDeque<GatewayError>>,
    drifting: AtomicBool,
    connects: AtomicU64,
    queries: AtomicU64,
}

impl ScriptedGateway {
    pub fn with_volume(volume: i32) -> Arc<Self> {
        let gateway = Self::default();
        gateway.volume.store(volume, Ordering::SeqCst);
        Arc::new(gateway)
    }

    pub fn set_volume(&self, volume: i32) {
        self.volume.store(volume, Ordering::SeqCst);
    }

    pub fn volume(&self) -> i32 {
        self.volume.load(Ordering::SeqCst)
    }

    /// Make the next `count` connection attempts fail
    pub fn fail_connects(&self, count: u32) {
        self.connect_failures_left.store(count, Ordering::SeqCst);
    }

    /// Queue an error for an upcoming query
    pub fn push_query_error(&self, error: GatewayError) {
        self.query_errors.lock().push_back(error);
    }

    /// Make every query observe a volume one higher than the last
    pub fn drift_every_query(&self) {
        self.drifting.store(true, Ordering::SeqCst);
    }

    /// Successful connections handed out
    pub fn connects(&self) -> u64 {
        self.connects.load(Ordering::SeqCst)
    }

    /// Queries answered, successfully or not
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }
}

struct ScriptedQuery {
    device: Arc<ScriptedGateway>,
}

impl VolumeQuery for ScriptedQuery {
    fn get_volume(&mut self) -> Result<i32, GatewayError> {
        self.device.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.device.query_errors.lock().pop_front() {
            return Err(error);
        }
        if self.device.drifting.load(Ordering::SeqCst) {
            return Ok(self.device.volume.fetch_add(1, Ordering::SeqCst) + 1);
        }
        Ok(self.device.volume())
    }
}

/// Gateway handle around a shared scripted device
pub struct ScriptedHandle(pub Arc<ScriptedGateway>);

impl Gateway for ScriptedHandle {
    fn connect(&self) -> Result<Box<dyn VolumeQuery>, GatewayError> {
        let left = self.0.connect_failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.0.connect_failures_left.store(left - 1, Ordering::SeqCst);
            return Err(GatewayError::Unavailable("wifi disabled".to_string()));
        }
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedQuery {
            device: Arc::clone(&self.0),
        }))
    }
}

/// Command sender that steps the scripted device's volume
pub struct SteppingCommands {
    device: Arc<ScriptedGateway>,
    pub sent: Mutex<Vec<RemoteCommand>>,
}

impl SteppingCommands {
    pub fn new(device: Arc<ScriptedGateway>) -> Arc<Self> {
        Arc::new(Self {
            device,
            sent: Mutex::new(Vec::new()),
        })
    }
}

impl CommandSender for SteppingCommands {
    fn send(&self, command: RemoteCommand) -> Result<(), GatewayError> {
        let step = match command {
            RemoteCommand::VolumeUp => 1,
            RemoteCommand::VolumeDown => -1,
        };
        self.device.set_volume(self.device.volume() + step);
        self.sent.lock().push(command);
        Ok(())
    }
}

/// Short interval for tests that rely on timed polls
pub fn fast_config() -> PollerConfig {
    PollerConfig::new()
        .with_poll_interval(Duration::from_millis(10))
        .with_report_lock_timeout(Duration::from_millis(2))
}

/// Interval long enough that only forced refreshes poll during a test
pub fn manual_config() -> PollerConfig {
    PollerConfig::new()
        .with_poll_interval(Duration::from_secs(60))
        .with_report_lock_timeout(Duration::from_millis(5))
}

/// Poll `condition` until it holds or two seconds pass
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}

pub fn next_volume(rx: &VolumeReceiver) -> Option<i32> {
    rx.recv_timeout(Duration::from_secs(2)).map(|e: VolumeEvent| e.volume())
}

pub fn drain(rx: &VolumeReceiver) -> Vec<i32> {
    rx.try_iter().map(|e| e.volume()).collect()
}
