//! Classifier backed by an external analysis command.
//!
//! The command receives the encoded frame on stdin and prints the analysis
//! as JSON on stdout. Both a single record and a list of per-face records
//! are accepted (the first face wins):
//!
//! ```text
//! {"dominant_emotion": "happy", "face_confidence": 0.93}
//! [{"dominant_emotion": "sad"}, {"dominant_emotion": "neutral"}]
//! ```

use crate::capture::Frame;
use crate::classifier::types::{Classification, ClassifierError, EmotionClassifier};
use crate::subprocess::{run_bounded, RunError};
use serde::Deserialize;
use std::time::Duration;

/// Deadline for one analysis run unless configured otherwise.
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct FaceAnalysis {
    dominant_emotion: Option<String>,
    /// Zero when detection was skipped and the whole frame was scored
    face_confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnalysisOutput {
    Faces(Vec<FaceAnalysis>),
    Face(FaceAnalysis),
}

/// Interpret the classifier's JSON output.
pub fn parse_analysis(stdout: &[u8]) -> Result<Classification, ClassifierError> {
    let output: AnalysisOutput = serde_json::from_slice(stdout)
        .map_err(|e| ClassifierError::Fault(format!("Invalid classifier output: {e}")))?;

    let face = match output {
        AnalysisOutput::Faces(faces) => faces.into_iter().next(),
        AnalysisOutput::Face(face) => Some(face),
    };

    let Some(face) = face else {
        return Ok(Classification::NoSignal);
    };

    if matches!(face.face_confidence, Some(c) if c <= 0.0) {
        return Ok(Classification::NoSignal);
    }

    Ok(face
        .dominant_emotion
        .as_deref()
        .map(Classification::from_label)
        .unwrap_or(Classification::NoSignal))
}

/// Runs an analysis program per frame.
///
/// A run that outlives its deadline is killed, so a hung program never
/// occupies the analysis thread past one timeout.
pub struct CommandClassifier {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandClassifier {
    /// Create a classifier from a command line (program followed by arguments).
    pub fn new(command: &[String]) -> Result<Self, ClassifierError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ClassifierError::Fault("No classifier command configured".to_string()))?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout: DEFAULT_ANALYSIS_TIMEOUT,
        })
    }

    /// Kill the analysis program when it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl EmotionClassifier for CommandClassifier {
    fn analyze(&mut self, frame: &Frame) -> Result<Classification, ClassifierError> {
        let output = run_bounded(&self.program, &self.args, Some(&frame.data), self.timeout)
            .map_err(|e| match e {
                RunError::TimedOut(timeout) => ClassifierError::Timeout(timeout),
                other => ClassifierError::Fault(format!("{}: {other}", self.program)),
            })?;

        if !output.status.success() {
            return Err(ClassifierError::Fault(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                output.stderr_text()
            )));
        }

        parse_analysis(&output.stdout)
    }
}
