//! Interval gate limiting how often frames are classified.
//!
//! The gate is keyed on frame capture time, so the classification rate is
//! bounded no matter how fast frames arrive.

use std::time::{Duration, Instant};

/// Tracks the last classification attempt.
#[derive(Debug, Clone)]
pub struct IntervalGate {
    min_interval: Duration,
    last_attempt: Option<Instant>,
}

impl IntervalGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_attempt: None,
        }
    }

    /// Whether a frame captured at `now` may be classified.
    ///
    /// Always open before the first attempt.
    pub fn is_open(&self, now: Instant) -> bool {
        match self.last_attempt {
            Some(last) => now.saturating_duration_since(last) >= self.min_interval,
            None => true,
        }
    }

    /// Record a classification attempt at `now`, closing the gate for one interval.
    pub fn mark_attempt(&mut self, now: Instant) {
        self.last_attempt = Some(now);
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn last_attempt(&self) -> Option<Instant> {
        self.last_attempt
    }
}
