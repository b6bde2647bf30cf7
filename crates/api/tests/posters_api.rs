//! Integration tests for the poster API's request/response surface:
//! validation, status lookups, job listing, and general HTTP
//! behaviour (request IDs, CORS, unknown routes).

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get, post_json, sh_worker};
use tower::ServiceExt;

const RETENTION: Duration = Duration::from_secs(300);

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_job_count() {
    let (_dir, worker) = sh_worker("exit 0\n");
    let app = common::build_test_app(worker, RETENTION);

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["activeJobs"], 0);
    assert!(json["timestamp"].is_string());
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_request_is_rejected_before_any_job_exists() {
    let (_dir, worker) = sh_worker("exit 0\n");
    let app = common::build_test_app(worker, RETENTION);

    let response = post_json(app.clone(), "/api/generate", serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    // No job was created.
    let listing = body_json(get(app, "/api/jobs").await).await;
    assert_eq!(listing.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn coords_without_country_is_rejected() {
    let (_dir, worker) = sh_worker("exit 0\n");
    let app = common::build_test_app(worker, RETENTION);

    let response = post_json(
        app,
        "/api/generate",
        serde_json::json!({"coords": "35.68,139.69"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("country"));
}

#[tokio::test]
async fn city_without_country_is_rejected() {
    let (_dir, worker) = sh_worker("exit 0\n");
    let app = common::build_test_app(worker, RETENTION);

    let response = post_json(app, "/api/generate", serde_json::json!({"city": "Porto"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Generate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_returns_job_id_and_logs_url() {
    let (_dir, worker) = sh_worker("echo ok\n");
    let app = common::build_test_app(worker, RETENTION);

    let response = post_json(
        app,
        "/api/generate",
        serde_json::json!({"city": "Tokyo", "country": "Japan"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let job_id = json["jobId"].as_str().expect("jobId should be a string");
    assert!(!job_id.is_empty());
    assert_eq!(json["message"], "Map generation started");
    assert_eq!(
        json["logsUrl"].as_str().unwrap(),
        format!("/api/logs/{job_id}")
    );
}

#[tokio::test]
async fn generated_job_ids_are_unique() {
    let (_dir, worker) = sh_worker("echo ok\n");
    let app = common::build_test_app(worker, RETENTION);

    let mut seen = std::collections::HashSet::new();
    for _ in 0..10 {
        let response = post_json(
            app.clone(),
            "/api/generate",
            serde_json::json!({"city": "Tokyo", "country": "Japan"}),
        )
        .await;
        let json = body_json(response).await;
        let job_id = json["jobId"].as_str().unwrap().to_string();
        assert!(seen.insert(job_id), "job id was issued twice");
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_job_status_returns_404() {
    let (_dir, worker) = sh_worker("exit 0\n");
    let app = common::build_test_app(worker, RETENTION);

    let response = get(app, "/api/jobs/1700000000000-zzzzzz").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn status_payload_uses_camel_case_fields() {
    let (_dir, worker) = sh_worker("echo ok\n");
    let app = common::build_test_app(worker, RETENTION);

    let created = body_json(
        post_json(
            app.clone(),
            "/api/generate",
            serde_json::json!({"city": "Tokyo", "country": "Japan"}),
        )
        .await,
    )
    .await;
    let job_id = created["jobId"].as_str().unwrap();

    let json = body_json(get(app, &format!("/api/jobs/{job_id}")).await).await;
    assert_eq!(json["jobId"], *job_id);
    assert!(json["status"].is_string());
    // Nullable fields are present as explicit nulls or values.
    assert!(json.get("exitCode").is_some());
    assert!(json.get("result").is_some());
    assert!(json.get("errorMessage").is_some());
    assert!(json["logCount"].is_number());
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_returns_jobs_in_creation_order() {
    let (_dir, worker) = sh_worker("echo ok\n");
    let app = common::build_test_app(worker, RETENTION);

    let mut created = Vec::new();
    for city in ["Tokyo", "Porto", "Oslo"] {
        let json = body_json(
            post_json(
                app.clone(),
                "/api/generate",
                serde_json::json!({"city": city, "country": "Somewhere"}),
            )
            .await,
        )
        .await;
        created.push(json["jobId"].as_str().unwrap().to_string());
    }

    let listing = body_json(get(app, "/api/jobs").await).await;
    let rows = listing.as_array().unwrap();
    assert_eq!(rows.len(), 3);

    for (row, expected_id) in rows.iter().zip(&created) {
        assert_eq!(row["jobId"].as_str().unwrap(), expected_id);
        assert!(row["status"].is_string());
        assert!(row["logCount"].is_number());
        assert!(row["config"]["city"].is_string());
    }
}

// ---------------------------------------------------------------------------
// General HTTP behaviour
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let (_dir, worker) = sh_worker("exit 0\n");
    let app = common::build_test_app(worker, RETENTION);

    let response = get(app, "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let (_dir, worker) = sh_worker("exit 0\n");
    let app = common::build_test_app(worker, RETENTION);

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );

    // The value should be a valid UUID (36 chars with hyphens).
    let id_str = request_id.unwrap().to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    let (_dir, worker) = sh_worker("exit 0\n");
    let app = common::build_test_app(worker, RETENTION);

    // CORS preflight requires custom headers, so we build the request manually.
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/generate")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let allow_origin = response
        .headers()
        .get("access-control-allow-origin")
        .expect("Missing Access-Control-Allow-Origin header")
        .to_str()
        .unwrap();
    assert_eq!(allow_origin, "http://localhost:5173");

    let allow_methods = response
        .headers()
        .get("access-control-allow-methods")
        .expect("Missing Access-Control-Allow-Methods header")
        .to_str()
        .unwrap();
    assert!(
        allow_methods.contains("POST"),
        "Allow-Methods should contain POST, got: {allow_methods}"
    );
}
