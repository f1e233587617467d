//! Frame types and the frame source capability.

use std::time::Instant;
use thiserror::Error;

/// One raw image frame.
///
/// The bytes are opaque to the agent; only the classifier interprets them.
#[derive(Clone)]
pub struct Frame {
    /// Encoded image data
    pub data: Vec<u8>,
    /// When the frame was captured
    pub captured_at: Instant,
    /// Position in the capture sequence, starting at 0
    pub sequence: u64,
}

impl Frame {
    pub fn new(data: Vec<u8>, sequence: u64) -> Self {
        Self::captured_at(data, sequence, Instant::now())
    }

    pub fn captured_at(data: Vec<u8>, sequence: u64, captured_at: Instant) -> Self {
        Self {
            data,
            captured_at,
            sequence,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("bytes", &self.data.len())
            .field("sequence", &self.sequence)
            .finish()
    }
}

/// Permanent capture failures. The sampling loop stops on any of these.
#[derive(Debug, Error)]
pub enum FrameSourceError {
    /// The capture device or program could not be opened
    #[error("Capture device unavailable: {0}")]
    Unavailable(String),
    /// The device stopped delivering frames
    #[error("Frame capture failed: {0}")]
    Capture(String),
}

/// Supplies frames on demand.
pub trait FrameSource {
    /// Pull the next frame. `Ok(None)` means the stream has ended.
    fn next_frame(&mut self) -> Result<Option<Frame>, FrameSourceError>;

    /// Release the underlying device.
    fn release(&mut self) {}
}
