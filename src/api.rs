//! HTTP client for the remote wellness collection API.
//!
//! The async [`WellnessClient`] carries the endpoints and the shared
//! `reqwest` client. Login lives in [`crate::session`], event delivery in
//! [`crate::reporter`]. [`BlockingWellnessClient`] wraps it for the
//! synchronous sampling loop.

use crate::config::Config;
use crate::reporter::{DeliveryError, EventReporter};
use crate::session::{Credentials, Session, SessionError};
use std::time::Duration;

/// Connection settings for the wellness API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base address, e.g. `https://localhost:7034/api/v1`
    pub base_url: String,
    /// Timeout for each request
    pub request_timeout: Duration,
    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
}

impl ApiConfig {
    /// Create a new API configuration with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(5),
            accept_invalid_certs: false,
        }
    }

    /// Build the API configuration from the agent configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.api_base.clone(),
            request_timeout: config.request_timeout,
            accept_invalid_certs: config.accept_invalid_certs,
        }
    }

    /// Base address without trailing slashes.
    pub fn url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Get the login endpoint URL.
    pub fn login_url(&self) -> String {
        format!("{}/auth/login", self.url())
    }

    /// Get the wellness events endpoint URL.
    pub fn events_url(&self) -> String {
        format!("{}/wellnessevents", self.url())
    }
}

/// Async client for the wellness API.
pub struct WellnessClient {
    pub(crate) config: ApiConfig,
    pub(crate) client: reqwest::Client,
    device_id: String,
}

impl WellnessClient {
    /// Create a new client.
    pub fn new(config: ApiConfig) -> Result<Self, reqwest::Error> {
        let device_id = device_id();
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(format!(
                "wellness-sensor-agent/{} ({device_id})",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        if config.accept_invalid_certs {
            tracing::warn!("TLS certificate verification is disabled for {}", config.url());
        }

        Ok(Self {
            config,
            client,
            device_id,
        })
    }

    /// Get the API configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Get the device ID.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

/// Blocking wellness client for use in synchronous contexts.
pub struct BlockingWellnessClient {
    inner: WellnessClient,
    runtime: tokio::runtime::Runtime,
}

impl BlockingWellnessClient {
    /// Create a new blocking client.
    ///
    /// Must not be called from inside a tokio runtime.
    pub fn new(config: ApiConfig) -> Result<Self, std::io::Error> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let inner = WellnessClient::new(config).map_err(std::io::Error::other)?;

        Ok(Self { inner, runtime })
    }

    /// Authenticate and obtain a session.
    pub fn establish(&self, credentials: &Credentials) -> Result<Session, SessionError> {
        self.runtime.block_on(self.inner.establish(credentials))
    }

    /// Get the device ID.
    pub fn device_id(&self) -> &str {
        self.inner.device_id()
    }

    /// Get the API configuration.
    pub fn config(&self) -> &ApiConfig {
        self.inner.config()
    }
}

impl EventReporter for BlockingWellnessClient {
    fn report(&self, session: &Session, label: &str) -> Result<(), DeliveryError> {
        self.runtime.block_on(self.inner.report(session, label))
    }
}

/// Device ID from hostname + instance.
fn device_id() -> String {
    let hostname = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!(
        "sensor-{}-{}",
        hostname,
        &uuid::Uuid::new_v4().to_string()[..8]
    )
}
