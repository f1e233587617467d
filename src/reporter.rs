//! Wellness event construction and delivery.
//!
//! Delivery is at-most-once: one request per event, no buffering and no
//! retry. A failed event is dropped by the caller after logging.

use crate::api::WellnessClient;
use crate::session::Session;
use serde::{Deserialize, Serialize};

/// Event type tag for emotion detections.
pub const EVENT_TYPE: &str = "emotion_detected";

/// Source tag identifying the sensor.
pub const EVENT_SOURCE: &str = "office_totem_camera";

/// Signal strength of a detection. Detection is binary, so this never varies.
pub const EVENT_VALUE: f64 = 1.0;

/// Confidence qualifier attached to every detection.
pub const CONFIDENCE: &str = "high";

/// Auxiliary data embedded as a JSON string in [`WellnessEvent::metadata_json`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionMetadata {
    pub detected_emotion: String,
    pub confidence: String,
}

/// Wire format of `POST /wellnessevents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessEvent {
    /// Always null: the kiosk does not know who is in front of it
    pub user_id: Option<String>,
    pub event_type: String,
    pub source: String,
    pub value: f64,
    pub metadata_json: String,
}

impl WellnessEvent {
    /// Build the event for a detected emotion label.
    pub fn emotion_detected(label: &str) -> Self {
        let metadata = EmotionMetadata {
            detected_emotion: label.to_string(),
            confidence: CONFIDENCE.to_string(),
        };

        Self {
            user_id: None,
            event_type: EVENT_TYPE.to_string(),
            source: EVENT_SOURCE.to_string(),
            value: EVENT_VALUE,
            // Serializing two string fields cannot fail.
            metadata_json: serde_json::to_string(&metadata).unwrap_or_default(),
        }
    }

    /// Parse the embedded metadata.
    pub fn metadata(&self) -> Result<EmotionMetadata, serde_json::Error> {
        serde_json::from_str(&self.metadata_json)
    }
}

/// Why a wellness event was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryErrorKind {
    /// The API answered with something other than 201
    Rejected,
    /// The request never got a response
    Transport,
    /// The event was refused locally and never sent
    InvalidEvent,
}

/// A wellness event was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryError {
    pub kind: DeliveryErrorKind,
    /// HTTP status, present only for [`DeliveryErrorKind::Rejected`]
    pub status: Option<u16>,
    /// Response body, transport message or local reason
    pub detail: String,
}

impl DeliveryError {
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: DeliveryErrorKind::Rejected,
            status: Some(status),
            detail: body.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: DeliveryErrorKind::Transport,
            status: None,
            detail: message.into(),
        }
    }

    pub fn invalid_event(reason: impl Into<String>) -> Self {
        Self {
            kind: DeliveryErrorKind::InvalidEvent,
            status: None,
            detail: reason.into(),
        }
    }

    /// Whether a request was sent but the API was never reached.
    pub fn is_transport(&self) -> bool {
        self.kind == DeliveryErrorKind::Transport
    }
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.kind, self.status) {
            (DeliveryErrorKind::Rejected, Some(status)) => {
                write!(f, "Event rejected ({status}): {}", self.detail)
            }
            (DeliveryErrorKind::InvalidEvent, _) => write!(f, "Event not sent: {}", self.detail),
            _ => write!(f, "Event not delivered: {}", self.detail),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Something that delivers detected emotions.
pub trait EventReporter {
    /// Send one wellness event for `label`. Succeeds only when the API
    /// acknowledges creation.
    fn report(&self, session: &Session, label: &str) -> Result<(), DeliveryError>;
}

impl WellnessClient {
    /// Send one wellness event for `label`.
    pub async fn report(&self, session: &Session, label: &str) -> Result<(), DeliveryError> {
        if label.trim().is_empty() {
            return Err(DeliveryError::invalid_event("empty emotion label"));
        }

        let event = WellnessEvent::emotion_detected(label);

        let response = self
            .client
            .post(self.config.events_url())
            .header("Authorization", session.bearer())
            .header("Content-Type", "application/json")
            .json(&event)
            .send()
            .await
            .map_err(|e| DeliveryError::transport(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::rejected(status.as_u16(), body));
        }

        tracing::info!(emotion = label, "Wellness event sent");
        Ok(())
    }
}
