//! Frame source backed by an external capture command.
//!
//! Each call runs the command once and takes its stdout as one encoded
//! frame, e.g. `ffmpeg -f v4l2 -i /dev/video0 -frames:v 1 -f image2pipe -`.

use crate::capture::types::{Frame, FrameSource, FrameSourceError};
use crate::subprocess::{run_bounded, RunError};
use std::time::Duration;

/// Deadline for one capture run unless configured otherwise.
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs a capture program per frame.
pub struct CommandFrameSource {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    next_sequence: u64,
}

impl CommandFrameSource {
    /// Create a source from a command line (program followed by arguments).
    pub fn new(command: &[String]) -> Result<Self, FrameSourceError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| FrameSourceError::Unavailable("No capture command configured".to_string()))?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout: DEFAULT_CAPTURE_TIMEOUT,
            next_sequence: 0,
        })
    }

    /// Treat a capture run longer than `timeout` as a wedged device.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl FrameSource for CommandFrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, FrameSourceError> {
        let output = run_bounded(&self.program, &self.args, None, self.timeout).map_err(|e| match e {
            RunError::Spawn(e) => FrameSourceError::Unavailable(format!("{}: {e}", self.program)),
            other => FrameSourceError::Capture(format!("{}: {other}", self.program)),
        })?;

        if !output.status.success() {
            return Err(FrameSourceError::Capture(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                output.stderr_text()
            )));
        }

        if output.stdout.is_empty() {
            return Err(FrameSourceError::Capture(format!(
                "{} produced an empty frame",
                self.program
            )));
        }

        let frame = Frame::new(output.stdout, self.next_sequence);
        self.next_sequence += 1;
        Ok(Some(frame))
    }
}
