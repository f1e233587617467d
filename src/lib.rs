//! Wellness Sensor Agent - ambient emotion sensing for office kiosks.
//!
//! The agent samples a camera, asks an external classifier for the dominant
//! emotion in the frame, and reports it as a wellness event to a remote
//! collection API.
//!
//! # Privacy Guarantees
//!
//! - **No frame storage**: Frames live in memory for one iteration only
//! - **Label only**: The only data sent is the emotion label
//! - **No identity**: Events carry no user identifier
//! - **Sparse**: At most one classification per sampling interval
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      Wellness Sensor Agent                       │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐            │
//! │  │ FrameSource │──▶│  Interval   │──▶│ Classifier  │            │
//! │  │  (camera)   │   │    Gate     │   │  (worker)   │            │
//! │  └─────────────┘   └─────────────┘   └─────────────┘            │
//! │                                             │                    │
//! │  ┌─────────────┐                     ┌─────────────┐            │
//! │  │   Session   │────── token ───────▶│  Reporter   │──▶ API     │
//! │  │  (login)    │                     │ (one POST)  │            │
//! │  └─────────────┘                     └─────────────┘            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//! use wellness_sensor_agent::{agent, transparency, CommandClassifier, CommandFrameSource, Config};
//!
//! let config = Config::load().expect("config");
//! let source = CommandFrameSource::new(&config.capture_command)
//!     .expect("capture")
//!     .with_timeout(config.capture_timeout);
//! let classifier = CommandClassifier::new(&config.classifier_command)
//!     .expect("classifier")
//!     .with_timeout(config.classifier_timeout);
//!
//! let running = Arc::new(AtomicBool::new(true));
//! let log = transparency::create_shared_log();
//! agent::run(&config, source, classifier, running, log).expect("agent");
//! ```

pub mod agent;
pub mod api;
pub mod capture;
pub mod classifier;
pub mod config;
pub mod core;
pub mod reporter;
pub mod session;
mod subprocess;
pub mod transparency;

// Re-export key types at crate root for convenience
pub use agent::AgentError;
pub use api::{ApiConfig, BlockingWellnessClient, WellnessClient};
pub use capture::{CommandFrameSource, Frame, FrameSource, FrameSourceError};
pub use classifier::{
    Classification, ClassifierError, ClassifierWorker, CommandClassifier, EmotionClassifier,
    SensedEmotion,
};
pub use config::{Config, ConfigError};
pub use crate::core::{IntervalGate, Iteration, LoopExit, SamplingLoop};
pub use reporter::{DeliveryError, DeliveryErrorKind, EventReporter, WellnessEvent};
pub use session::{Credentials, Session, SessionError};
pub use transparency::{SharedTransparencyLog, TransparencyLog, TransparencyStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Privacy declaration that can be displayed to users.
pub const PRIVACY_DECLARATION: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║          WELLNESS SENSOR AGENT - PRIVACY DECLARATION             ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  This device samples its camera to sense the general mood of     ║
║  the room.                                                       ║
║                                                                  ║
║  ✓ WHAT WE SEND:                                                 ║
║    • One emotion label (e.g. "happy") at most every few seconds  ║
║    • A fixed tag naming this sensor                              ║
║                                                                  ║
║  ✗ WHAT WE NEVER SEND OR STORE:                                  ║
║    • Camera images or video                                      ║
║    • Who you are (events carry no user identifier)               ║
║    • Face measurements or classifier scores                      ║
║                                                                  ║
║  Frames are analyzed in memory and discarded immediately.        ║
║                                                                  ║
║  Statistics for the current run are printed when the agent       ║
║  stops.                                                          ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
