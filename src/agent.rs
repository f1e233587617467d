//! Agent startup: validate configuration, log in once, then sample.
//!
//! Login happens before the frame source is touched. If it fails the
//! sampling loop never starts.

use crate::api::{ApiConfig, BlockingWellnessClient};
use crate::capture::{FrameSource, FrameSourceError};
use crate::classifier::{ClassifierError, ClassifierWorker, EmotionClassifier};
use crate::config::{Config, ConfigError};
use crate::core::{LoopExit, SamplingLoop};
use crate::session::{Credentials, Session, SessionError};
use crate::transparency::SharedTransparencyLog;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use thiserror::Error;

/// Reasons the agent stops abnormally.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Failed to initialize: {0}")]
    Setup(String),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error(transparent)]
    FrameSource(#[from] FrameSourceError),
}

/// Create the API client and log in with the configured account.
pub fn connect(config: &Config) -> Result<(BlockingWellnessClient, Session), AgentError> {
    config.validate()?;

    let client = BlockingWellnessClient::new(ApiConfig::from_config(config))
        .map_err(|e| AgentError::Setup(format!("HTTP client: {e}")))?;

    let credentials = Credentials::new(&config.account_email, &config.account_secret);
    let session = client.establish(&credentials)?;

    Ok((client, session))
}

/// Log in and run the sampling loop until it stops.
pub fn run<F, C>(
    config: &Config,
    source: F,
    classifier: C,
    running: Arc<AtomicBool>,
    transparency: SharedTransparencyLog,
) -> Result<LoopExit, AgentError>
where
    F: FrameSource,
    C: EmotionClassifier + 'static,
{
    let (client, session) = connect(config)?;
    tracing::info!(device_id = client.device_id(), "Session established");

    let worker = ClassifierWorker::spawn(classifier, config.classifier_timeout)?;
    let mut sampler = SamplingLoop::new(source, worker, client, session, config.sampling_interval)
        .with_transparency(transparency)
        .with_stop_flag(running);

    tracing::info!(
        interval_secs = config.sampling_interval.as_secs(),
        "Sampling started"
    );

    Ok(sampler.run()?)
}
