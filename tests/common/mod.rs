//! Shared fixtures: a mock wellness API and scripted collaborators.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use wellness_sensor_agent::{
    Classification, ClassifierError, EmotionClassifier, Frame, FrameSource, FrameSourceError,
};

/// How the mock answers `POST /auth/login`.
#[derive(Debug, Clone)]
pub enum LoginBehavior {
    /// 200 with `token` for matching credentials, 401 otherwise
    Accept {
        email: String,
        password: String,
        token: String,
    },
    /// Always answer with this status and an error body
    Status(u16),
    /// 200 without a token field
    MissingToken,
}

/// A request received on `POST /wellnessevents`.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

impl RecordedEvent {
    /// Parse the embedded `metadataJson` string.
    pub fn metadata(&self) -> Value {
        let raw = self.body["metadataJson"]
            .as_str()
            .expect("metadataJson is a string");
        serde_json::from_str(raw).expect("metadataJson is valid JSON")
    }
}

struct MockState {
    login: LoginBehavior,
    login_requests: Vec<Value>,
    event_statuses: VecDeque<u16>,
    events: Vec<RecordedEvent>,
}

type Shared = Arc<Mutex<MockState>>;

/// Wellness API mock served on an ephemeral port from its own runtime thread.
pub struct MockApi {
    addr: SocketAddr,
    state: Shared,
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockApi {
    pub fn start(login: LoginBehavior) -> Self {
        let state = Arc::new(Mutex::new(MockState {
            login,
            login_requests: Vec::new(),
            event_statuses: VecDeque::new(),
            events: Vec::new(),
        }));

        let app = Router::new()
            .route("/api/v1/auth/login", post(login_handler))
            .route("/api/v1/wellnessevents", post(events_handler))
            .with_state(state.clone());

        let (addr_tx, addr_rx) = std::sync::mpsc::channel();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("mock runtime");
            runtime.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
                addr_tx
                    .send(listener.local_addr().expect("local addr"))
                    .expect("report addr");
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .expect("serve");
            });
        });

        let addr = addr_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("mock API did not start");

        Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
        }
    }

    /// Mock accepting `email`/`password` and issuing `token`.
    pub fn accepting(email: &str, password: &str, token: &str) -> Self {
        Self::start(LoginBehavior::Accept {
            email: email.to_string(),
            password: password.to_string(),
            token: token.to_string(),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    /// Answer the next event posts with these statuses, then 201 again.
    pub fn queue_event_statuses(&self, statuses: &[u16]) {
        self.state
            .lock()
            .unwrap()
            .event_statuses
            .extend(statuses.iter().copied());
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn login_requests(&self) -> Vec<Value> {
        self.state.lock().unwrap().login_requests.clone()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        // The server thread winds down on its own; idle keep-alive
        // connections must not block the test.
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn login_handler(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.login_requests.push(body.clone());

    match &state.login {
        LoginBehavior::Accept {
            email,
            password,
            token,
        } => {
            if body["email"] == email.as_str() && body["password"] == password.as_str() {
                (StatusCode::OK, Json(json!({ "token": token })))
            } else {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "Invalid credentials" })),
                )
            }
        }
        LoginBehavior::Status(status) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(json!({ "message": "Login unavailable" })),
        ),
        LoginBehavior::MissingToken => (StatusCode::OK, Json(json!({ "user": "iot" }))),
    }
}

async fn events_handler(
    State(state): State<Shared>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };

    let mut state = state.lock().unwrap();
    state.events.push(RecordedEvent {
        authorization: header("authorization"),
        content_type: header("content-type"),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });

    let status = state.event_statuses.pop_front().unwrap_or(201);
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status == StatusCode::CREATED {
        (status, Json(json!({ "id": state.events.len() })))
    } else {
        (status, Json(json!({ "message": "Event store unavailable" })))
    }
}

/// Frame source emitting frames at fixed offsets (seconds) from its creation.
pub struct ScriptedSource {
    start: Instant,
    offsets: VecDeque<Duration>,
    next_sequence: u64,
    pulls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn at_secs(secs: &[u64]) -> (Self, Arc<AtomicUsize>) {
        let pulls = Arc::new(AtomicUsize::new(0));
        let source = Self {
            start: Instant::now(),
            offsets: secs.iter().map(|s| Duration::from_secs(*s)).collect(),
            next_sequence: 0,
            pulls: pulls.clone(),
        };
        (source, pulls)
    }
}

impl FrameSource for ScriptedSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, FrameSourceError> {
        self.pulls.fetch_add(1, Ordering::SeqCst);
        Ok(self.offsets.pop_front().map(|offset| {
            let frame = Frame::captured_at(vec![0u8; 32], self.next_sequence, self.start + offset);
            self.next_sequence += 1;
            frame
        }))
    }
}

/// Classifier replaying labels in order; `None` stands for no face.
pub struct ScriptedClassifier {
    labels: VecDeque<Option<&'static str>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedClassifier {
    pub fn new(labels: &[Option<&'static str>]) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = Self {
            labels: labels.iter().copied().collect(),
            calls: calls.clone(),
        };
        (classifier, calls)
    }
}

impl EmotionClassifier for ScriptedClassifier {
    fn analyze(&mut self, _frame: &Frame) -> Result<Classification, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.labels.pop_front() {
            Some(Some(label)) => Ok(Classification::from_label(label)),
            Some(None) => Ok(Classification::NoSignal),
            None => Err(ClassifierError::Fault("script exhausted".to_string())),
        }
    }
}

/// Base URL on a local port where nothing listens.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/api/v1")
}
