//! Authentication against the wellness API.
//!
//! A [`Session`] is obtained once at startup and passed explicitly to every
//! event delivery. There is no refresh: if the token expires, the agent has
//! to be restarted.

use crate::api::WellnessClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account identity used to log in.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("secret", &"********")
            .finish()
    }
}

/// An authenticated session.
#[derive(Clone)]
pub struct Session {
    token: String,
    established_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            established_at: Utc::now(),
        }
    }

    /// The bearer token.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("established_at", &self.established_at)
            .finish()
    }
}

/// Login failures. All of them are fatal for the agent.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Email or secret missing; no request was made
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(&'static str),
    /// The API rejected the login or answered without a token
    #[error("Authentication failed ({status}): {message}")]
    Authentication { status: u16, message: String },
    /// The login request could not complete
    #[error("Connectivity error: {0}")]
    Connectivity(String),
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

impl WellnessClient {
    /// Log in and return a session holding the issued bearer token.
    ///
    /// Only status 200 with a non-empty `token` is accepted. A single attempt
    /// is made.
    pub async fn establish(&self, credentials: &Credentials) -> Result<Session, SessionError> {
        if credentials.email.trim().is_empty() {
            return Err(SessionError::InvalidCredentials("email is empty"));
        }
        if credentials.secret.is_empty() {
            return Err(SessionError::InvalidCredentials("secret is empty"));
        }

        tracing::info!(email = %credentials.email, "Logging in to {}", self.config.url());

        let response = self
            .client
            .post(self.config.login_url())
            .json(&LoginRequest {
                email: &credentials.email,
                password: &credentials.secret,
            })
            .send()
            .await
            .map_err(|e| SessionError::Connectivity(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SessionError::Authentication {
                status: status.as_u16(),
                message,
            });
        }

        let body: LoginResponse =
            response
                .json()
                .await
                .map_err(|e| SessionError::Authentication {
                    status: status.as_u16(),
                    message: format!("Malformed login response: {e}"),
                })?;

        match body.token {
            Some(token) if !token.is_empty() => {
                tracing::info!("Login succeeded");
                Ok(Session::new(token))
            }
            _ => Err(SessionError::Authentication {
                status: status.as_u16(),
                message: "Login response did not contain a token".to_string(),
            }),
        }
    }
}
