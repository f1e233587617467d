//! Core sampling logic for the Wellness Sensor Agent.
//!
//! This module contains:
//! - Interval gating of classifier invocations
//! - The sampling loop tying capture, classification and reporting together

pub mod gate;
pub mod sampling;

pub use gate::IntervalGate;
pub use sampling::{Iteration, LoopExit, SamplingLoop};
