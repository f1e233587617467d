//! Emotion classification.
//!
//! The classifier itself (face detection and emotion scoring) is an
//! external collaborator behind [`EmotionClassifier`]. [`ClassifierWorker`]
//! runs it on an analysis thread so every call has a deadline.

pub mod command;
pub mod types;
pub mod worker;

// Re-export commonly used types
pub use command::CommandClassifier;
pub use types::{Classification, ClassifierError, EmotionClassifier, SensedEmotion};
pub use worker::ClassifierWorker;
