//! Position ticker
//!
//! Fixed-interval sampler bound to one engine handle. The controller drives it
//! with explicit instants; cancelling drops the binding.

use crate::engine::HandleId;
use std::time::{Duration, Instant};

/// Periodic position sampler
#[derive(Debug, Clone)]
pub struct PositionTicker {
    /// Sampling interval
    interval: Duration,

    /// Handle being sampled and the next due instant
    armed: Option<(HandleId, Instant)>,
}

impl PositionTicker {
    /// Create an idle ticker
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            armed: None,
        }
    }

    /// Bind to `handle`, first sample due one interval after `now`
    ///
    /// Re-arming replaces any previous binding.
    pub fn arm(&mut self, handle: HandleId, now: Instant) {
        self.armed = Some((handle, now + self.interval));
    }

    /// Stop sampling
    pub fn cancel(&mut self) {
        self.armed = None;
    }

    /// Whether a handle is bound
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Handle currently bound
    pub fn handle(&self) -> Option<HandleId> {
        self.armed.map(|(handle, _)| handle)
    }

    /// Sampling interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the bound handle when a sample is due at `now`
    ///
    /// Missed intervals collapse into one sample.
    pub fn poll(&mut self, now: Instant) -> Option<HandleId> {
        let (handle, due) = self.armed?;
        if now < due {
            return None;
        }

        let mut next = due + self.interval;
        if next <= now {
            next = now + self.interval;
        }
        self.armed = Some((handle, next));
        Some(handle)
    }
}
