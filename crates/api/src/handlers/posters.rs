//! Handlers for the poster rendering resource.
//!
//! `generate_poster` is the only mutating endpoint: it validates the
//! request, allocates the job, and hands it to the process runner
//! before responding. Everything else is a read-only view over the
//! registry.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use atlasprint_core::job::{JobStatus, PosterResult};
use atlasprint_core::poster::PosterConfig;
use atlasprint_core::CoreError;
use atlasprint_engine::runner;

use crate::error::AppResult;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Generate
// ---------------------------------------------------------------------------

/// Response for a successfully started job.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub job_id: String,
    pub message: &'static str,
    pub logs_url: String,
}

/// POST /api/generate
///
/// Start a new rendering job. The configuration is validated first;
/// a validation failure returns 400 and no job is created. On success
/// the worker is already spawning when the response is sent.
pub async fn generate_poster(
    State(state): State<AppState>,
    Json(config): Json<PosterConfig>,
) -> AppResult<impl IntoResponse> {
    config.validate()?;

    let job_id = state.registry.create(config).await;
    runner::spawn(
        state.registry.clone(),
        state.config.worker.clone(),
        job_id.clone(),
    );

    tracing::info!(job_id = %job_id, "Map generation started");

    Ok(Json(GenerateResponse {
        logs_url: format!("/api/logs/{job_id}"),
        job_id,
        message: "Map generation started",
    }))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Point-in-time job status payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub exit_code: Option<i32>,
    pub result: Option<PosterResult>,
    pub error_message: Option<String>,
    pub log_count: usize,
}

/// GET /api/jobs/{jobId}
///
/// Get a single job's status snapshot. 404 once the job has been
/// evicted (or never existed).
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let info = state
        .registry
        .status(&job_id)
        .await
        .ok_or(CoreError::NotFound {
            entity: "Job",
            id: job_id.clone(),
        })?;

    Ok(Json(StatusResponse {
        job_id,
        status: info.status,
        exit_code: info.exit_code,
        result: info.result,
        error_message: info.error_message,
        log_count: info.log_count,
    }))
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// GET /api/jobs
///
/// List all known jobs in creation order. Operational/debug use.
pub async fn list_jobs(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(state.registry.list().await))
}
