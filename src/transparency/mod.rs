//! Transparency module for the Wellness Sensor Agent.
//!
//! Exposes what the agent did during a run so operators can verify that
//! nothing beyond emotion labels leaves the device.

pub mod log;

// Re-export commonly used types
pub use log::{create_shared_log, SharedTransparencyLog, TransparencyLog, TransparencyStats};
