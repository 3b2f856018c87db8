//! Fake worker HTTP services for integration tests.
//!
//! Each fake worker records every call it receives (path + raw body) and
//! answers from a small behavior table: canned JSON per path, an injected
//! failure, or a delayed response for barrier-timing tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::Router;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Initializes test logging once per process; respects RUST_LOG.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

#[derive(Clone)]
pub struct RecordedCall {
    pub path: String,
    pub body: Vec<u8>,
}

#[derive(Clone)]
struct ResponseSpec {
    status: StatusCode,
    body: Vec<u8>,
    delay: Duration,
}

impl ResponseSpec {
    fn ok_empty() -> Self {
        ResponseSpec {
            status: StatusCode::OK,
            body: Vec::new(),
            delay: Duration::ZERO,
        }
    }
}

/// Response table for one fake worker.
#[derive(Clone, Default)]
pub struct WorkerBehavior {
    routes: HashMap<String, ResponseSpec>,
    fallback: Option<ResponseSpec>,
}

impl WorkerBehavior {
    /// Answers 200 with an empty body on every path.
    pub fn ok() -> Self {
        WorkerBehavior::default()
    }

    /// Answers 200 with an empty body after `delay`, on every path.
    pub fn ok_after(delay: Duration) -> Self {
        WorkerBehavior {
            routes: HashMap::new(),
            fallback: Some(ResponseSpec {
                delay,
                ..ResponseSpec::ok_empty()
            }),
        }
    }

    /// Fails every path with `status` after `delay`.
    pub fn failing_after(status: u16, delay: Duration) -> Self {
        WorkerBehavior {
            routes: HashMap::new(),
            fallback: Some(ResponseSpec {
                status: StatusCode::from_u16(status).expect("valid status"),
                body: b"injected failure".to_vec(),
                delay,
            }),
        }
    }

    /// Fails every path with `status` immediately.
    pub fn failing(status: u16) -> Self {
        Self::failing_after(status, Duration::ZERO)
    }

    /// Canned JSON response for one path.
    pub fn with_json<T: Serialize>(self, path: &str, value: &T) -> Self {
        self.with_json_after(path, value, Duration::ZERO)
    }

    /// Canned JSON response for one path, delivered after `delay`.
    pub fn with_json_after<T: Serialize>(mut self, path: &str, value: &T, delay: Duration) -> Self {
        let body = serde_json::to_vec(value).expect("serialize fixture");
        self.routes.insert(
            path.to_string(),
            ResponseSpec {
                status: StatusCode::OK,
                body,
                delay,
            },
        );
        self
    }

    /// Raw response bytes for one path, e.g. to simulate a malformed body.
    pub fn with_raw(mut self, path: &str, status: u16, body: &[u8]) -> Self {
        self.routes.insert(
            path.to_string(),
            ResponseSpec {
                status: StatusCode::from_u16(status).expect("valid status"),
                body: body.to_vec(),
                delay: Duration::ZERO,
            },
        );
        self
    }
}

#[derive(Clone)]
struct WorkerState {
    behavior: WorkerBehavior,
    hits: Arc<Mutex<Vec<RecordedCall>>>,
}

pub struct FakeWorker {
    pub base_url: String,
    hits: Arc<Mutex<Vec<RecordedCall>>>,
}

impl FakeWorker {
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.hits.lock().expect("hits lock").clone()
    }

    pub fn hits_for(&self, path: &str) -> usize {
        self.calls().iter().filter(|call| call.path == path).count()
    }

    pub fn body_for(&self, path: &str) -> Option<Vec<u8>> {
        self.calls()
            .iter()
            .find(|call| call.path == path)
            .map(|call| call.body.clone())
    }
}

async fn handle(
    State(state): State<WorkerState>,
    uri: Uri,
    body: Bytes,
) -> (StatusCode, Vec<u8>) {
    let path = uri.path().to_string();
    state.hits.lock().expect("hits lock").push(RecordedCall {
        path: path.clone(),
        body: body.to_vec(),
    });

    let spec = state
        .behavior
        .routes
        .get(&path)
        .or(state.behavior.fallback.as_ref())
        .cloned()
        .unwrap_or_else(ResponseSpec::ok_empty);

    if spec.delay > Duration::ZERO {
        tokio::time::sleep(spec.delay).await;
    }
    (spec.status, spec.body)
}

/// Binds a fake worker on an ephemeral port and serves it for the rest of the
/// test process.
pub async fn spawn_worker(behavior: WorkerBehavior) -> FakeWorker {
    let hits = Arc::new(Mutex::new(Vec::new()));
    let state = WorkerState {
        behavior,
        hits: hits.clone(),
    };

    let app = Router::new().fallback(handle).with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake worker");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve fake worker");
    });

    FakeWorker {
        base_url: format!("http://{addr}"),
        hits,
    }
}

/// Spawns `count` identically-behaving fake workers.
pub async fn spawn_fleet(count: usize, behavior: WorkerBehavior) -> Vec<FakeWorker> {
    let mut workers = Vec::with_capacity(count);
    for _ in 0..count {
        workers.push(spawn_worker(behavior.clone()).await);
    }
    workers
}

pub fn fleet_urls(workers: &[FakeWorker]) -> Vec<String> {
    workers.iter().map(|w| w.base_url.clone()).collect()
}
