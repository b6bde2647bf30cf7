//! Route definitions for the poster rendering resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{posters, stream};
use crate::state::AppState;

/// Routes mounted at `/api`.
///
/// ```text
/// POST   /generate        -> generate_poster
/// GET    /jobs            -> list_jobs
/// GET    /jobs/{jobId}    -> get_job_status
/// GET    /logs/{jobId}    -> stream_logs (SSE)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(posters::generate_poster))
        .route("/jobs", get(posters::list_jobs))
        .route("/jobs/{job_id}", get(posters::get_job_status))
        .route("/logs/{job_id}", get(stream::stream_logs))
}
