#![allow(dead_code)]

//! In-process stand-in for the Bonsai API and its object storage.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const API_KEY: &str = "test-api-key";
pub const RISC0_VERSION: &str = "0.19.1";
pub const INPUT_ID: &str = "input-0001";
pub const SESSION_ID: &str = "session-0001";
pub const SNARK_ID: &str = "snark-0001";

/// Headers observed on one request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeenHeaders {
    pub api_key: Option<String>,
    pub version: Option<String>,
}

#[derive(Default)]
pub struct MockState {
    pub base_url: String,
    pub session_statuses: VecDeque<Value>,
    pub snark_statuses: VecDeque<Value>,
    pub session_polls: usize,
    pub snark_polls: usize,
    pub storage: HashMap<String, Vec<u8>>,
    pub stored_images: HashSet<String>,
    pub sessions_created: Vec<Value>,
    pub snarks_created: Vec<Value>,
    pub api_headers: Vec<SeenHeaders>,
    pub storage_headers: Vec<SeenHeaders>,
}

#[derive(Clone, Default)]
pub struct MockService(Arc<Mutex<MockState>>);

impl MockService {
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.0.lock().unwrap()
    }

    /// Binds to an ephemeral port, serves in the background and returns the base URL.
    pub async fn spawn(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        self.state().base_url = base_url.clone();

        let router = self.router();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        base_url
    }

    /// Stores `receipt` and queues a `SUCCEEDED` session status pointing at it.
    pub fn push_session_success(&self, receipt: &[u8]) {
        let mut state = self.state();
        let key = format!("receipts/{SESSION_ID}");
        let receipt_url = format!("{}/storage/{key}", state.base_url);
        state.storage.insert(key, receipt.to_vec());
        state.session_statuses.push_back(json!({
            "status": "SUCCEEDED",
            "receipt_url": receipt_url,
            "elapsed_time": 12.5,
        }));
    }

    pub fn push_session_status(&self, status: Value) {
        self.state().session_statuses.push_back(status);
    }

    pub fn push_snark_status(&self, status: Value) {
        self.state().snark_statuses.push_back(status);
    }

    fn router(&self) -> Router {
        let api = Router::new()
            .route("/version", get(version))
            .route("/inputs/upload", get(input_upload))
            .route("/images/upload/{image_id}", get(image_upload))
            .route("/sessions/create", post(session_create))
            .route("/sessions/status/{uuid}", get(session_status))
            .route("/snark/create", post(snark_create))
            .route("/snark/status/{uuid}", get(snark_status))
            .route_layer(middleware::from_fn_with_state(self.clone(), require_api_key));

        let storage = Router::new().route("/storage/{*key}", get(storage_get).put(storage_put));

        api.merge(storage).with_state(self.clone())
    }
}

pub fn sample_snark_receipt() -> Value {
    json!({
        "snark": {
            "a": [[1, 2], [3, 4]],
            "b": [[[5], [6]], [[7], [8]]],
            "c": [[9], [10]],
        },
        "post_state_digest": [0xaa, 0xbb],
        "journal": [21, 0, 0, 0, 0, 0, 0, 0],
    })
}

fn seen(headers: &HeaderMap) -> SeenHeaders {
    let value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    SeenHeaders {
        api_key: value("x-api-key"),
        version: value("x-risc0-version"),
    }
}

async fn require_api_key(
    State(service): State<MockService>,
    request: Request,
    next: Next,
) -> Response {
    let headers = seen(request.headers());
    service.state().api_headers.push(headers.clone());
    if headers.api_key.as_deref() != Some(API_KEY) {
        return (StatusCode::UNAUTHORIZED, "invalid api key").into_response();
    }
    next.run(request).await
}

async fn version() -> Json<Value> {
    Json(json!({ "risc0_zkvm": [RISC0_VERSION] }))
}

async fn input_upload(State(service): State<MockService>) -> Json<Value> {
    let base_url = service.state().base_url.clone();
    Json(json!({
        "url": format!("{base_url}/storage/inputs/{INPUT_ID}"),
        "uuid": INPUT_ID,
    }))
}

async fn image_upload(
    State(service): State<MockService>,
    Path(image_id): Path<String>,
) -> Response {
    let state = service.state();
    if state.stored_images.contains(&image_id) {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(json!({ "url": format!("{}/storage/images/{image_id}", state.base_url) })).into_response()
}

async fn session_create(
    State(service): State<MockService>,
    Json(body): Json<Value>,
) -> Json<Value> {
    service.state().sessions_created.push(body);
    Json(json!({ "uuid": SESSION_ID }))
}

async fn session_status(
    State(service): State<MockService>,
    Path(uuid): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    if uuid != SESSION_ID {
        return Err((StatusCode::NOT_FOUND, format!("no session {uuid}")));
    }
    let mut state = service.state();
    state.session_polls += 1;
    state
        .session_statuses
        .pop_front()
        .map(Json)
        .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "no status queued".to_string()))
}

async fn snark_create(
    State(service): State<MockService>,
    Json(body): Json<Value>,
) -> Json<Value> {
    service.state().snarks_created.push(body);
    Json(json!({ "uuid": SNARK_ID }))
}

async fn snark_status(
    State(service): State<MockService>,
    Path(uuid): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    if uuid != SNARK_ID {
        return Err((StatusCode::NOT_FOUND, format!("no snark {uuid}")));
    }
    let mut state = service.state();
    state.snark_polls += 1;
    state
        .snark_statuses
        .pop_front()
        .map(Json)
        .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "no status queued".to_string()))
}

async fn storage_get(
    State(service): State<MockService>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<Vec<u8>, StatusCode> {
    let mut state = service.state();
    state.storage_headers.push(seen(&headers));
    state.storage.get(&key).cloned().ok_or(StatusCode::NOT_FOUND)
}

async fn storage_put(
    State(service): State<MockService>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let mut state = service.state();
    state.storage_headers.push(seen(&headers));
    if let Some(image_id) = key.strip_prefix("images/") {
        state.stored_images.insert(image_id.to_string());
    }
    state.storage.insert(key, body.to_vec());
    StatusCode::OK
}
