//! Background volume poller
//!
//! A [`Poller`] owns one thread that repeatedly waits for the poll interval
//! (or a force-refresh), reads the remote volume, and reports values that
//! differ from the last known one to a [`ChangeSink`].
//!
//! ```text
//!   Idle ──start()──► Waiting ──timeout / force──► Querying
//!                        ▲                             │
//!                        └─────────── round done ──────┘
//!   Waiting / Querying ──cancel observed──► Stopped (terminal)
//! ```
//!
//! The gateway connection is opened lazily and retried every cycle. A query
//! failure keeps the connection unless it reports lost connectivity.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use remote_gateway::{Gateway, VolumeQuery};

use crate::config::PollerConfig;
use crate::error::{Result, VolumeSyncError};

/// Receiver of volume values observed by the poller
pub trait ChangeSink: Send + Sync + 'static {
    /// The value the poller compares fresh readings against
    fn last_known_volume(&self) -> i32;

    /// Record and broadcast a changed volume
    ///
    /// Must give up once `signal` reports cancellation instead of blocking
    /// the poller thread indefinitely.
    fn report_change(&self, volume: i32, signal: &PollerSignal);
}

/// Lifecycle state of a poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Constructed, thread not started
    Idle,
    /// Sleeping until the interval elapses or a refresh is forced
    Waiting,
    /// Talking to the gateway
    Querying,
    /// Cycle exited; a new poller is needed to resume
    Stopped,
}

struct SignalFlags {
    force_refresh: bool,
    cancelled: bool,
    state: PollerState,
}

/// Wait/wake signaling shared between a poller and its thread
pub struct PollerSignal {
    flags: Mutex<SignalFlags>,
    wake: Condvar,
}

impl PollerSignal {
    fn new() -> Self {
        Self {
            flags: Mutex::new(SignalFlags {
                force_refresh: false,
                cancelled: false,
                state: PollerState::Idle,
            }),
            wake: Condvar::new(),
        }
    }

    /// Request an immediate poll
    pub fn force_refresh(&self) {
        let mut flags = self.flags.lock();
        flags.force_refresh = true;
        self.wake.notify_one();
    }

    /// Request the cycle to exit
    pub fn cancel(&self) {
        let mut flags = self.flags.lock();
        flags.cancelled = true;
        self.wake.notify_one();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flags.lock().cancelled
    }

    pub fn state(&self) -> PollerState {
        self.flags.lock().state
    }

    fn set_state(&self, state: PollerState) {
        self.flags.lock().state = state;
    }

    /// Sleep until `interval` elapses, a refresh is forced, or the poller is
    /// cancelled. Returns `false` when the cycle should exit.
    fn wait(&self, interval: Duration) -> bool {
        let mut flags = self.flags.lock();
        if flags.cancelled {
            return false;
        }
        flags.state = PollerState::Waiting;

        // An interval too large to represent as a deadline never times out
        match Instant::now().checked_add(interval) {
            Some(deadline) => {
                while !flags.force_refresh && !flags.cancelled {
                    if self.wake.wait_until(&mut flags, deadline).timed_out() {
                        break;
                    }
                }
            }
            None => {
                while !flags.force_refresh && !flags.cancelled {
                    self.wake.wait(&mut flags);
                }
            }
        }

        flags.force_refresh = false;
        if flags.cancelled {
            return false;
        }
        flags.state = PollerState::Querying;
        true
    }
}

#[derive(Debug, Default)]
struct PollerCounters {
    cycles: AtomicU64,
    connect_attempts: AtomicU64,
    connect_failures: AtomicU64,
    queries: AtomicU64,
    query_failures: AtomicU64,
    changes_reported: AtomicU64,
}

/// Snapshot of a poller's activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerStats {
    pub state: PollerState,
    pub cycles: u64,
    pub connect_attempts: u64,
    pub connect_failures: u64,
    pub queries: u64,
    pub query_failures: u64,
    pub changes_reported: u64,
    pub uptime: Option<Duration>,
}

impl fmt::Display for PollerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Volume Poller Stats:")?;
        writeln!(f, "  State: {:?}", self.state)?;
        writeln!(f, "  Cycles: {}", self.cycles)?;
        writeln!(
            f,
            "  Connects: {} ({} failed)",
            self.connect_attempts, self.connect_failures
        )?;
        writeln!(f, "  Queries: {} ({} failed)", self.queries, self.query_failures)?;
        writeln!(f, "  Changes reported: {}", self.changes_reported)?;
        if let Some(uptime) = self.uptime {
            writeln!(f, "  Uptime: {:?}", uptime)?;
        }
        Ok(())
    }
}

/// A single background polling task
pub struct Poller {
    config: PollerConfig,
    signal: Arc<PollerSignal>,
    counters: Arc<PollerCounters>,
    /// Collaborators handed to the thread on `start`
    launch: Option<(Arc<dyn Gateway>, Arc<dyn ChangeSink>)>,
    handle: Option<JoinHandle<()>>,
    started_at: Option<Instant>,
}

impl Poller {
    pub fn new(config: PollerConfig, gateway: Arc<dyn Gateway>, sink: Arc<dyn ChangeSink>) -> Self {
        Self {
            config,
            signal: Arc::new(PollerSignal::new()),
            counters: Arc::new(PollerCounters::default()),
            launch: Some((gateway, sink)),
            handle: None,
            started_at: None,
        }
    }

    /// Start the polling cycle on a dedicated thread
    ///
    /// A poller runs at most once; calling this again is an error.
    pub fn start(&mut self) -> Result<()> {
        let (gateway, sink) = self.launch.take().ok_or(VolumeSyncError::AlreadyStarted)?;

        let signal = Arc::clone(&self.signal);
        let counters = Arc::clone(&self.counters);
        let interval = self.config.poll_interval;

        // Waiting before the thread exists so a concurrent observer never
        // sees a started poller as Idle.
        self.signal.set_state(PollerState::Waiting);

        let spawned = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || run_poll_loop(gateway, sink, signal, counters, interval));

        match spawned {
            Ok(handle) => {
                tracing::debug!(interval = ?interval, "Volume poller started");
                self.handle = Some(handle);
                self.started_at = Some(Instant::now());
                Ok(())
            }
            Err(e) => {
                self.signal.set_state(PollerState::Stopped);
                Err(VolumeSyncError::PollerSpawn(e))
            }
        }
    }

    /// Wake the cycle for an immediate poll; no effect unless running
    pub fn force_refresh(&self) {
        if self.is_running() {
            self.signal.force_refresh();
        }
    }

    /// Cancel the cycle and block until its thread has exited
    ///
    /// No gateway query happens after this returns.
    pub fn stop_and_join(&mut self) {
        self.signal.cancel();

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Volume poller thread panicked");
            }
            tracing::debug!("Volume poller stopped");
        }

        self.launch = None;
        self.signal.set_state(PollerState::Stopped);
    }

    pub fn state(&self) -> PollerState {
        self.signal.state()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    pub fn stats(&self) -> PollerStats {
        let c = &self.counters;
        PollerStats {
            state: self.state(),
            cycles: c.cycles.load(Ordering::Relaxed),
            connect_attempts: c.connect_attempts.load(Ordering::Relaxed),
            connect_failures: c.connect_failures.load(Ordering::Relaxed),
            queries: c.queries.load(Ordering::Relaxed),
            query_failures: c.query_failures.load(Ordering::Relaxed),
            changes_reported: c.changes_reported.load(Ordering::Relaxed),
            uptime: self.started_at.map(|t| t.elapsed()),
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop_and_join();
        }
    }
}

/// The polling cycle run on the poller thread
fn run_poll_loop(
    gateway: Arc<dyn Gateway>,
    sink: Arc<dyn ChangeSink>,
    signal: Arc<PollerSignal>,
    counters: Arc<PollerCounters>,
    interval: Duration,
) {
    let mut connection: Option<Box<dyn VolumeQuery>> = None;

    while signal.wait(interval) {
        counters.cycles.fetch_add(1, Ordering::Relaxed);

        if connection.is_none() {
            counters.connect_attempts.fetch_add(1, Ordering::Relaxed);
            match gateway.connect() {
                Ok(query) => {
                    tracing::debug!("Gateway connection acquired");
                    connection = Some(query);
                }
                Err(e) => {
                    counters.connect_failures.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(error = %e, "Gateway unavailable, retrying next cycle");
                }
            }
        }

        let Some(query) = connection.as_mut() else {
            continue;
        };

        // Connecting may have taken long enough for a stop to arrive
        if signal.is_cancelled() {
            break;
        }

        counters.queries.fetch_add(1, Ordering::Relaxed);
        let volume = match query.get_volume() {
            Ok(volume) => volume,
            Err(e) => {
                counters.query_failures.fetch_add(1, Ordering::Relaxed);
                if e.is_connectivity_lost() {
                    tracing::warn!(error = %e, "Lost gateway connection, reconnecting next cycle");
                    connection = None;
                } else {
                    tracing::warn!(error = %e, "Volume query failed");
                }
                continue;
            }
        };

        if signal.is_cancelled() {
            break;
        }

        if volume != sink.last_known_volume() {
            counters.changes_reported.fetch_add(1, Ordering::Relaxed);
            sink.report_change(volume, &signal);
        }
    }

    signal.set_state(PollerState::Stopped);
    tracing::debug!("Volume poll loop exited");
}
