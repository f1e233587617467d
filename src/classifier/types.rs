//! Classification results and the classifier capability.

use crate::capture::Frame;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// A dominant emotion observed in a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensedEmotion {
    /// Label exactly as the classifier reported it, e.g. "happy"
    pub label: String,
    pub observed_at: DateTime<Utc>,
}

impl SensedEmotion {
    /// Wrap a raw classifier label. Blank labels carry no signal.
    pub fn from_label(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        Some(Self {
            label: raw.to_string(),
            observed_at: Utc::now(),
        })
    }
}

/// Outcome of analyzing one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Detected(SensedEmotion),
    /// No usable subject in the frame
    NoSignal,
}

impl Classification {
    /// Build from a raw label, mapping blank labels to [`Classification::NoSignal`].
    pub fn from_label(raw: &str) -> Self {
        match SensedEmotion::from_label(raw) {
            Some(emotion) => Classification::Detected(emotion),
            None => Classification::NoSignal,
        }
    }
}

/// Classifier failures. None of them stop the agent.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The classifier ran and failed
    #[error("Classifier fault: {0}")]
    Fault(String),
    /// No result within the deadline
    #[error("Classifier timed out after {0:?}")]
    Timeout(Duration),
    /// A previous timed-out call is still occupying the classifier
    #[error("Classifier busy with an earlier frame")]
    Busy,
}

/// Derives the dominant emotion from a frame.
///
/// Frames without a detectable subject must yield
/// [`Classification::NoSignal`], not an error.
pub trait EmotionClassifier: Send {
    fn analyze(&mut self, frame: &Frame) -> Result<Classification, ClassifierError>;
}
