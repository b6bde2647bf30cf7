pub mod health;
pub mod posters;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /generate          start a rendering job (POST)
/// /jobs              list all known jobs
/// /jobs/{jobId}      job status snapshot
/// /logs/{jobId}      live log stream (SSE)
/// ```
pub fn api_routes() -> Router<AppState> {
    posters::router()
}
