//! Frame capture for the Wellness Sensor Agent.
//!
//! The camera is an external collaborator reached through the
//! [`FrameSource`] trait. Frames are held in memory only for the duration
//! of one loop iteration and never written anywhere.

pub mod command;
pub mod types;

// Re-export commonly used types
pub use command::CommandFrameSource;
pub use types::{Frame, FrameSource, FrameSourceError};
