//! In-process mock of the Vertex AI REST endpoints used by the quickstart

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub const PROJECT: &str = "demo-project";
pub const LOCATION: &str = "us-central1";
pub const CORPUS: &str = "projects/demo-project/locations/us-central1/ragCorpora/4242";
pub const ANSWER: &str = "Zero trust assumes no implicit trust; every request is verified.";

/// A request seen by the mock
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

/// Which call the mock should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    None,
    /// Import request rejected with HTTP 400
    ImportRequest,
    /// Import operation finishes with an error status
    ImportOperation,
    /// retrieveContexts answers HTTP 503
    Retrieve,
    /// Corpus creation reports `done: false` for this many polls
    SlowCreate(usize),
    /// Corpus creation never finishes
    StuckCreate,
}

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    failure: Failure,
}

pub struct MockVertex {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockVertex {
    pub async fn start(failure: Failure) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            requests: requests.clone(),
            failure,
        };
        let app = Router::new().fallback(handle).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// `METHOD suffix` of every request, for asserting call order
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| {
                let tail = r.path.rsplit('/').next().unwrap_or_default();
                format!("{} {}", r.method, tail)
            })
            .collect()
    }

    pub fn find(&self, suffix: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with(suffix))
            .collect()
    }
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let path = uri.path().to_string();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let (import_count, create_polls) = {
        let mut requests = state.requests.lock().unwrap();
        requests.push(Recorded {
            method: method.to_string(),
            path: path.clone(),
            authorization,
            body: body.clone(),
        });
        let count = |suffix: &str| requests.iter().filter(|r| r.path.ends_with(suffix)).count();
        (count("/ragFiles:import"), count("/operations/create-1"))
    };

    let parent = format!("/v1/projects/{}/locations/{}", PROJECT, LOCATION);
    let create_op = format!("projects/{}/locations/{}/operations/create-1", PROJECT, LOCATION);
    let create_pending = !create_done(state.failure, create_polls);

    match (method, path.as_str()) {
        (Method::POST, p) if p == format!("{}/ragCorpora", parent) => (
            StatusCode::OK,
            Json(json!({
                "name": create_op,
                "metadata": {"@type": "type.googleapis.com/google.cloud.aiplatform.v1.CreateRagCorpusOperationMetadata"}
            })),
        ),
        (Method::GET, p) if p.ends_with("/operations/create-1") && create_pending => (
            StatusCode::OK,
            Json(json!({"name": create_op, "done": false})),
        ),
        (Method::GET, p) if p.ends_with("/operations/create-1") => (
            StatusCode::OK,
            Json(json!({
                "name": "create-1",
                "done": true,
                "response": {
                    "@type": "type.googleapis.com/google.cloud.aiplatform.v1.RagCorpus",
                    "name": CORPUS,
                    "displayName": "test_corpus"
                }
            })),
        ),
        (Method::POST, p) if p == format!("/v1/{}/ragFiles:import", CORPUS) => {
            if state.failure == Failure::ImportRequest {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": {"code": 400, "message": "Invalid GCS uri", "status": "INVALID_ARGUMENT"}})),
                );
            }
            (
                StatusCode::OK,
                Json(json!({
                    "name": format!("projects/{}/locations/{}/operations/import-{}", PROJECT, LOCATION, import_count)
                })),
            )
        }
        (Method::GET, p) if p.contains("/operations/import-") => {
            if state.failure == Failure::ImportOperation {
                return (
                    StatusCode::OK,
                    Json(json!({"name": "import", "done": true, "error": {"code": 9, "message": "Drive file not shared"}})),
                );
            }
            (
                StatusCode::OK,
                Json(json!({
                    "name": "import",
                    "done": true,
                    "response": {"importedRagFilesCount": "2", "skippedRagFilesCount": "0"}
                })),
            )
        }
        (Method::POST, p) if p == format!("{}:retrieveContexts", parent) => {
            if state.failure == Failure::Retrieve {
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({"error": {"code": 503, "message": "backend unavailable", "status": "UNAVAILABLE"}})),
                );
            }
            (
                StatusCode::OK,
                Json(json!({
                    "contexts": {"contexts": [
                        {"sourceUri": "gs://zt-docs/sp800-207.pdf", "sourceDisplayName": "sp800-207.pdf", "text": "Zero trust architecture...", "score": 0.27}
                    ]}
                })),
            )
        }
        (Method::POST, p) if p.ends_with(":generateContent") => (
            StatusCode::OK,
            Json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": ANSWER}]},
                    "finishReason": "STOP"
                }],
                "modelVersion": "gemini-2.5-flash"
            })),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"code": 404, "message": format!("no route for {}", path), "status": "NOT_FOUND"}})),
        ),
    }
}

/// Whether the `polls`-th GET of the create operation reports completion
fn create_done(failure: Failure, polls: usize) -> bool {
    match failure {
        Failure::SlowCreate(pending) => polls > pending,
        Failure::StuckCreate => false,
        _ => true,
    }
}
