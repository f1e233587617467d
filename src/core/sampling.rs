//! The sampling loop: frame → interval gate → classifier → reporter.
//!
//! One sequential thread of control. Per-frame failures (no face,
//! classifier fault or timeout, rejected event) end only the current
//! iteration. The loop terminates on the stop flag, at end of stream, or
//! when the frame source fails.

use crate::capture::{FrameSource, FrameSourceError};
use crate::classifier::{Classification, ClassifierError, ClassifierWorker, SensedEmotion};
use crate::core::gate::IntervalGate;
use crate::reporter::{DeliveryError, EventReporter};
use crate::session::Session;
use crate::transparency::{create_shared_log, SharedTransparencyLog};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What happened to one frame.
#[derive(Debug)]
pub enum Iteration {
    /// Within the sampling interval; not classified
    Gated,
    /// Classified, no usable subject
    NoSignal,
    /// Classifier faulted, timed out or was busy
    ClassifierFailed(ClassifierError),
    /// Event delivered
    Reported(SensedEmotion),
    /// Event dropped
    DeliveryFailed(DeliveryError),
    /// The frame source has no more frames
    EndOfStream,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The stop flag was cleared
    Stopped,
    /// The frame source ended
    EndOfStream,
}

/// Drives frames through classification and reporting.
pub struct SamplingLoop<F, R> {
    source: F,
    classifier: ClassifierWorker,
    reporter: R,
    session: Session,
    gate: IntervalGate,
    transparency: SharedTransparencyLog,
    running: Arc<AtomicBool>,
}

impl<F: FrameSource, R: EventReporter> SamplingLoop<F, R> {
    pub fn new(
        source: F,
        classifier: ClassifierWorker,
        reporter: R,
        session: Session,
        sampling_interval: Duration,
    ) -> Self {
        Self {
            source,
            classifier,
            reporter,
            session,
            gate: IntervalGate::new(sampling_interval),
            transparency: create_shared_log(),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Record counters into `log` instead of a private one.
    pub fn with_transparency(mut self, log: SharedTransparencyLog) -> Self {
        self.transparency = log;
        self
    }

    /// Stop when `running` is cleared (e.g. by a Ctrl+C handler).
    pub fn with_stop_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    /// Process one frame.
    pub fn step(&mut self) -> Result<Iteration, FrameSourceError> {
        let Some(frame) = self.source.next_frame()? else {
            return Ok(Iteration::EndOfStream);
        };
        self.transparency.record_frame();
        tracing::trace!(sequence = frame.sequence, bytes = frame.len(), "Frame observed");

        if !self.gate.is_open(frame.captured_at) {
            return Ok(Iteration::Gated);
        }

        // Re-armed on every attempt, whatever the outcome.
        self.gate.mark_attempt(frame.captured_at);
        self.transparency.record_classification();

        let sequence = frame.sequence;
        let emotion = match self.classifier.classify(frame) {
            Ok(Classification::Detected(emotion)) => emotion,
            Ok(Classification::NoSignal) => {
                tracing::debug!(sequence, "No face detected");
                self.transparency.record_no_signal();
                return Ok(Iteration::NoSignal);
            }
            Err(e) => {
                tracing::warn!(sequence, "Classification failed: {e}");
                self.transparency.record_classifier_failure();
                return Ok(Iteration::ClassifierFailed(e));
            }
        };

        tracing::info!(sequence, emotion = %emotion.label, "Emotion detected");

        match self.reporter.report(&self.session, &emotion.label) {
            Ok(()) => {
                self.transparency.record_event_sent();
                Ok(Iteration::Reported(emotion))
            }
            Err(e) => {
                tracing::warn!(emotion = %emotion.label, "Dropping wellness event: {e}");
                self.transparency.record_event_failed();
                Ok(Iteration::DeliveryFailed(e))
            }
        }
    }

    /// Run until stopped, the stream ends, or the frame source fails.
    ///
    /// A frame source error raised after the stop flag was cleared counts
    /// as a stop. The frame source is released in every case.
    pub fn run(&mut self) -> Result<LoopExit, FrameSourceError> {
        let result = loop {
            if !self.running.load(Ordering::SeqCst) {
                tracing::info!("Stop requested");
                break Ok(LoopExit::Stopped);
            }

            match self.step() {
                Ok(Iteration::EndOfStream) => {
                    tracing::info!("Frame source ended");
                    break Ok(LoopExit::EndOfStream);
                }
                Ok(_) => {}
                // A capture interrupted by the same Ctrl+C is a stop, not a failure.
                Err(e) if !self.running.load(Ordering::SeqCst) => {
                    tracing::info!("Stop requested during capture: {e}");
                    break Ok(LoopExit::Stopped);
                }
                Err(e) => {
                    tracing::error!("Frame source failed: {e}");
                    break Err(e);
                }
            }
        };

        self.source.release();
        result
    }

    pub fn transparency(&self) -> &SharedTransparencyLog {
        &self.transparency
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn source(&self) -> &F {
        &self.source
    }
}
