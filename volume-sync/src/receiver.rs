//! Receiving end of a channel-backed subscriber
//!
//! Provides a blocking iterator interface for consuming volume events
//! without requiring async/await.

use std::sync::mpsc;
use std::time::Duration;

use crate::event::VolumeEvent;

/// Blocking receiver of volume events
///
/// `next()` blocks until an event arrives or the subscriber is dropped.
/// Use `try_recv()` for non-blocking access.
pub struct VolumeReceiver {
    rx: mpsc::Receiver<VolumeEvent>,
}

impl VolumeReceiver {
    pub(crate) fn new(rx: mpsc::Receiver<VolumeEvent>) -> Self {
        Self { rx }
    }

    /// Block until an event is available
    ///
    /// Returns `None` once every clone of the subscriber is gone.
    pub fn recv(&self) -> Option<VolumeEvent> {
        self.rx.recv().ok()
    }

    /// Returns `None` if no event is currently queued
    pub fn try_recv(&self) -> Option<VolumeEvent> {
        self.rx.try_recv().ok()
    }

    /// Block until an event is available or the timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<VolumeEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Non-blocking iterator over the events queued right now
    pub fn try_iter(&self) -> TryIterator<'_> {
        TryIterator { inner: self }
    }

    /// Blocks for up to `timeout` on each call to `next()`
    pub fn timeout_iter(&self, timeout: Duration) -> TimeoutIterator<'_> {
        TimeoutIterator {
            inner: self,
            timeout,
        }
    }
}

impl Iterator for VolumeReceiver {
    type Item = VolumeEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

/// Non-blocking iterator over currently queued events
pub struct TryIterator<'a> {
    inner: &'a VolumeReceiver,
}

impl<'a> Iterator for TryIterator<'a> {
    type Item = VolumeEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}

/// Blocking iterator with a per-item timeout
pub struct TimeoutIterator<'a> {
    inner: &'a VolumeReceiver,
    timeout: Duration,
}

impl<'a> Iterator for TimeoutIterator<'a> {
    type Item = VolumeEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.recv_timeout(self.timeout)
    }
}
