//! Per-run transparency counters.
//!
//! Tracks how many frames the agent looked at and what it did with them,
//! without retaining any frame, label or event. Counters live in memory
//! only and are printed when the agent stops.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Transparency statistics for the current run.
#[derive(Debug)]
pub struct TransparencyLog {
    /// Frames pulled from the frame source
    frames_observed: AtomicU64,
    /// Frames handed to the classifier
    classifications: AtomicU64,
    /// Classifier calls with no usable subject
    no_signal: AtomicU64,
    /// Classifier calls that faulted or timed out
    classifier_failures: AtomicU64,
    /// Events acknowledged by the API
    events_sent: AtomicU64,
    /// Events the API rejected or never received
    events_failed: AtomicU64,
    /// Run start time
    session_start: DateTime<Utc>,
}

impl TransparencyLog {
    /// Create a new transparency log.
    pub fn new() -> Self {
        Self {
            frames_observed: AtomicU64::new(0),
            classifications: AtomicU64::new(0),
            no_signal: AtomicU64::new(0),
            classifier_failures: AtomicU64::new(0),
            events_sent: AtomicU64::new(0),
            events_failed: AtomicU64::new(0),
            session_start: Utc::now(),
        }
    }

    pub fn record_frame(&self) {
        self.frames_observed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_classification(&self) {
        self.classifications.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_no_signal(&self) {
        self.no_signal.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_classifier_failure(&self) {
        self.classifier_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_sent(&self) {
        self.events_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_failed(&self) {
        self.events_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> TransparencyStats {
        TransparencyStats {
            frames_observed: self.frames_observed.load(Ordering::Relaxed),
            classifications: self.classifications.load(Ordering::Relaxed),
            no_signal: self.no_signal.load(Ordering::Relaxed),
            classifier_failures: self.classifier_failures.load(Ordering::Relaxed),
            events_sent: self.events_sent.load(Ordering::Relaxed),
            events_failed: self.events_failed.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Frames observed: {}\n\
             - Frames classified: {}\n\
             - No face detected: {}\n\
             - Classifier failures: {}\n\
             - Events sent: {}\n\
             - Events dropped: {}\n\
             - Session duration: {} seconds\n\
             \n\
             Privacy Guarantee:\n\
             - No frames stored or transmitted\n\
             - Only the dominant emotion label leaves this device",
            stats.frames_observed,
            stats.classifications,
            stats.no_signal,
            stats.classifier_failures,
            stats.events_sent,
            stats.events_failed,
            stats.session_duration_secs
        )
    }
}

impl Default for TransparencyLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of transparency statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransparencyStats {
    pub frames_observed: u64,
    pub classifications: u64,
    pub no_signal: u64,
    pub classifier_failures: u64,
    pub events_sent: u64,
    pub events_failed: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Thread-safe shared transparency log.
pub type SharedTransparencyLog = Arc<TransparencyLog>;

/// Create a new shared transparency log.
pub fn create_shared_log() -> SharedTransparencyLog {
    Arc::new(TransparencyLog::new())
}
