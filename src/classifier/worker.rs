//! Bounded-time classification on a dedicated analysis thread.
//!
//! The sampling loop hands a frame to the worker and waits at most
//! `timeout` for the answer. A call that misses its deadline keeps running
//! on the worker until it returns (a [`CommandClassifier`] kills its
//! program at the same deadline). Until then new calls fail fast with
//! [`ClassifierError::Busy`] and no frame is queued behind it; the late
//! result is discarded.
//!
//! [`CommandClassifier`]: crate::classifier::CommandClassifier

use crate::capture::Frame;
use crate::classifier::types::{Classification, ClassifierError, EmotionClassifier};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

struct Job {
    id: u64,
    frame: Frame,
}

struct JobResult {
    id: u64,
    outcome: Result<Classification, ClassifierError>,
}

/// Runs an [`EmotionClassifier`] with a per-call deadline.
pub struct ClassifierWorker {
    jobs: Option<Sender<Job>>,
    results: Receiver<JobResult>,
    timeout: Duration,
    next_id: u64,
    /// Call that missed its deadline and has not returned yet
    abandoned: Option<u64>,
    handle: Option<JoinHandle<()>>,
}

impl ClassifierWorker {
    /// Move `classifier` onto a new analysis thread.
    pub fn spawn<C>(classifier: C, timeout: Duration) -> Result<Self, ClassifierError>
    where
        C: EmotionClassifier + 'static,
    {
        let (job_tx, job_rx) = bounded::<Job>(1);
        let (result_tx, result_rx) = bounded::<JobResult>(4);

        let handle = std::thread::Builder::new()
            .name("emotion-classifier".to_string())
            .spawn(move || run_worker(classifier, job_rx, result_tx))
            .map_err(|e| ClassifierError::Fault(format!("Failed to start classifier thread: {e}")))?;

        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            timeout,
            next_id: 0,
            abandoned: None,
            handle: Some(handle),
        })
    }

    /// Classify `frame`, waiting at most the configured timeout.
    pub fn classify(&mut self, frame: Frame) -> Result<Classification, ClassifierError> {
        while let Ok(late) = self.results.try_recv() {
            if self.abandoned == Some(late.id) {
                tracing::debug!(id = late.id, "Discarding late classification");
                self.abandoned = None;
            }
        }
        if self.abandoned.is_some() {
            return Err(ClassifierError::Busy);
        }

        let id = self.next_id;
        self.next_id += 1;

        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| ClassifierError::Fault("Classifier worker stopped".to_string()))?;

        match jobs.try_send(Job { id, frame }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => return Err(ClassifierError::Busy),
            Err(TrySendError::Disconnected(_)) => {
                return Err(ClassifierError::Fault(
                    "Classifier worker stopped".to_string(),
                ))
            }
        }

        let deadline = Instant::now() + self.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(remaining) {
                Ok(result) if result.id == id => return result.outcome,
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) => {
                    self.abandoned = Some(id);
                    return Err(ClassifierError::Timeout(self.timeout));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(ClassifierError::Fault(
                        "Classifier worker stopped".to_string(),
                    ))
                }
            }
        }
    }
}

impl Drop for ClassifierWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            // A hung classifier must not block shutdown.
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }
}

fn run_worker<C: EmotionClassifier>(
    mut classifier: C,
    jobs: Receiver<Job>,
    results: Sender<JobResult>,
) {
    for job in jobs.iter() {
        let outcome = classifier.analyze(&job.frame);
        if results.send(JobResult { id: job.id, outcome }).is_err() {
            break;
        }
    }
}
