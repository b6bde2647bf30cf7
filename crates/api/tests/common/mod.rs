//! Shared harness for the api integration suites.
//!
//! Builds the production router (same middleware stack as `main.rs`)
//! against a stub worker: a shell script executed by `/bin/sh` stands
//! in for the Python rendering script, which keeps the full
//! spawn/capture/stream path real without requiring the actual
//! renderer.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use atlasprint_api::config::ServerConfig;
use atlasprint_api::routes;
use atlasprint_api::state::AppState;
use atlasprint_engine::{JobRegistry, WorkerConfig};

/// Write `body` to a temp shell script and return a worker config that
/// runs it via `/bin/sh`. The returned `TempDir` must be kept alive
/// for as long as jobs may still spawn the script.
pub fn sh_worker(body: &str) -> (tempfile::TempDir, WorkerConfig) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let script = dir.path().join("worker.sh");
    std::fs::write(&script, body).expect("script should be written");

    let worker = WorkerConfig {
        python_bin: "/bin/sh".to_string(),
        script_path: script.to_string_lossy().into_owned(),
        working_dir: None,
    };

    (dir, worker)
}

/// A worker whose interpreter does not exist, for spawn-failure tests.
pub fn missing_worker() -> WorkerConfig {
    WorkerConfig {
        python_bin: "/nonexistent/atlasprint-worker".to_string(),
        script_path: "render.py".to_string(),
        working_dir: None,
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(worker: WorkerConfig, retention: Duration) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        retention_secs: retention.as_secs(),
        worker,
    }
}

/// Build the full application router with all middleware layers.
///
/// This mirrors the router construction in `main.rs` so integration
/// tests exercise the same middleware stack (CORS, request ID,
/// timeout, tracing, panic recovery) that production uses.
pub fn build_test_app(worker: WorkerConfig, retention: Duration) -> Router {
    let config = test_config(worker, retention);
    let registry = JobRegistry::new(retention);

    let state = AppState {
        config: Arc::new(config),
        registry,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Issue a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a POST request with a JSON body against the app.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body to completion and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Collect a response body to completion as text.
///
/// For SSE responses this returns once the event stream closes, i.e.
/// after the terminal frame.
pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).expect("response body should be UTF-8")
}

/// Parse every `data:` frame of an SSE body into a JSON value,
/// skipping keep-alive comments and blank separators.
pub fn sse_frames(body: &str) -> Vec<serde_json::Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).expect("SSE frame should be JSON"))
        .collect()
}
