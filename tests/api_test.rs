//! Integration tests for login and event delivery against a mock wellness API

mod common;

use common::{LoginBehavior, MockApi};
use std::time::Duration;
use wellness_sensor_agent::{ApiConfig, Credentials, Session, SessionError, WellnessClient};

fn client_for(mock: &MockApi) -> WellnessClient {
    let mut config = ApiConfig::new(mock.base_url());
    config.request_timeout = Duration::from_secs(2);
    WellnessClient::new(config).expect("Failed to create client")
}

#[tokio::test]
async fn test_establish_returns_issued_token() {
    for (email, password, token) in [
        ("iot.device@example.com", "Password123!", "T1"),
        ("kiosk@example.com", "another secret", "eyJhbGciOiJIUzI1NiJ9.payload.sig"),
    ] {
        let mock = MockApi::accepting(email, password, token);
        let client = client_for(&mock);

        let session = client
            .establish(&Credentials::new(email, password))
            .await
            .expect("login should succeed");

        assert_eq!(session.token(), token);

        let requests = mock.login_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["email"], email);
        assert_eq!(requests[0]["password"], password);
    }
}

#[tokio::test]
async fn test_rejected_credentials_are_authentication_error() {
    let mock = MockApi::accepting("iot.device@example.com", "right", "T1");
    let client = client_for(&mock);

    let result = client
        .establish(&Credentials::new("iot.device@example.com", "wrong"))
        .await;

    match result {
        Err(SessionError::Authentication { status, message }) => {
            assert_eq!(status, 401);
            assert!(message.contains("Invalid credentials"));
        }
        other => panic!("expected authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_200_login_is_authentication_error() {
    for status in [201, 403, 500] {
        let mock = MockApi::start(LoginBehavior::Status(status));
        let client = client_for(&mock);

        let result = client.establish(&Credentials::new("a@b.c", "secret")).await;
        assert!(
            matches!(result, Err(SessionError::Authentication { status: s, .. }) if s == status),
            "status {status} should be rejected"
        );
    }
}

#[tokio::test]
async fn test_login_without_token_is_authentication_error() {
    let mock = MockApi::start(LoginBehavior::MissingToken);
    let client = client_for(&mock);

    let result = client.establish(&Credentials::new("a@b.c", "secret")).await;
    assert!(matches!(
        result,
        Err(SessionError::Authentication { status: 200, .. })
    ));
}

#[tokio::test]
async fn test_report_sends_one_event_per_label() {
    let mock = MockApi::accepting("a@b.c", "secret", "T1");
    let client = client_for(&mock);
    let session = Session::new("T1");

    let labels = ["angry", "disgust", "fear", "happy", "sad", "surprise", "neutral"];
    for label in labels {
        client.report(&session, label).await.expect("event accepted");
    }

    let events = mock.events();
    assert_eq!(events.len(), labels.len());

    for (event, label) in events.iter().zip(labels) {
        assert_eq!(event.authorization.as_deref(), Some("Bearer T1"));
        assert_eq!(event.content_type.as_deref(), Some("application/json"));
        assert!(event.body["userId"].is_null());
        assert_eq!(event.body["eventType"], "emotion_detected");
        assert_eq!(event.body["source"], "office_totem_camera");
        assert_eq!(event.body["value"], 1.0);

        let metadata = event.metadata();
        assert_eq!(metadata["detected_emotion"], label);
        assert_eq!(metadata["confidence"], "high");
    }
}

#[tokio::test]
async fn test_report_requires_created_status() {
    let mock = MockApi::accepting("a@b.c", "secret", "T1");
    mock.queue_event_statuses(&[500, 200]);
    let client = client_for(&mock);
    let session = Session::new("T1");

    let err = client.report(&session, "happy").await.unwrap_err();
    assert_eq!(err.status, Some(500));
    assert!(err.detail.contains("Event store unavailable"));

    // 200 is not the "created" acknowledgement.
    let err = client.report(&session, "happy").await.unwrap_err();
    assert_eq!(err.status, Some(200));

    client.report(&session, "happy").await.expect("201 accepted");

    // One request per call, no retries.
    assert_eq!(mock.events().len(), 3);
}

#[tokio::test]
async fn test_report_transport_failure() {
    let mut config = ApiConfig::new(common::unreachable_base_url());
    config.request_timeout = Duration::from_secs(2);
    let client = WellnessClient::new(config).unwrap();

    let err = client.report(&Session::new("T1"), "sad").await.unwrap_err();
    assert!(err.is_transport());

    let result = client.establish(&Credentials::new("a@b.c", "secret")).await;
    assert!(matches!(result, Err(SessionError::Connectivity(_))));
}
