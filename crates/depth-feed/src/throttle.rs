//! Render-rate throttle for ladder snapshots
//!
//! The engine itself never throttles. A renderer marks the book dirty after
//! each mutation and polls the throttle to decide when to take a snapshot.
//! The first change is emitted immediately; changes inside the interval are
//! coalesced into one trailing emission.

use std::time::{Duration, Instant};

/// Default minimum gap between two renders
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(50);

/// Leading + trailing edge throttle
#[derive(Debug, Clone)]
pub struct SnapshotThrottle {
    interval: Duration,
    last_emit: Option<Instant>,
    dirty: bool,
}

impl SnapshotThrottle {
    /// Create a throttle with a custom interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            dirty: false,
        }
    }

    /// Get the interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record that the book changed
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check if a change is waiting to be rendered
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns true when a snapshot should be rendered now
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.dirty {
            return false;
        }
        let due = match self.last_emit {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        };
        if due {
            self.last_emit = Some(now);
            self.dirty = false;
        }
        due
    }

    /// When the pending change becomes due, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.dirty {
            return None;
        }
        self.last_emit.map(|last| last + self.interval)
    }

    /// Forget pending changes and the last emission
    pub fn reset(&mut self) {
        self.last_emit = None;
        self.dirty = false;
    }
}

impl Default for SnapshotThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE)
    }
}
