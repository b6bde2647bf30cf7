//! SSE transport adapter for job log streams.
//!
//! Bridges a job's broadcast feed onto a Server-Sent Events response.
//! Every frame is a `data:` JSON object tagged by `"type"`; the
//! sequence is `connected`, the backlog, live entries while the job
//! runs, and exactly one terminal frame before the stream closes.
//!
//! Subscriber lifetime is tied to the response body: a client
//! disconnect drops the stream and with it the broadcast receiver, so
//! no explicit detach bookkeeping exists. A subscriber that lags past
//! the feed capacity is dropped rather than awaited; the worker's
//! output capture is never throttled by a slow viewer.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, KeepAliveStream, Sse};
use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use atlasprint_core::job::{JobStatus, LogChannel, LogEntry, PosterResult};
use atlasprint_core::CoreError;
use atlasprint_engine::JobSubscription;
use atlasprint_events::JobEvent;

use crate::error::AppResult;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Wire form of one SSE `data:` frame.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StreamFrame {
    #[serde(rename_all = "camelCase")]
    Connected { job_id: String },
    Stdout { message: String },
    Stderr { message: String },
    #[serde(rename_all = "camelCase")]
    Complete {
        status: JobStatus,
        exit_code: Option<i32>,
        result: Option<PosterResult>,
    },
    Error { message: String },
}

impl StreamFrame {
    fn from_entry(entry: LogEntry) -> Self {
        match entry.channel {
            LogChannel::Stdout => StreamFrame::Stdout {
                message: entry.message,
            },
            LogChannel::Stderr => StreamFrame::Stderr {
                message: entry.message,
            },
        }
    }

    fn into_sse(self) -> Event {
        Event::default().json_data(&self).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to serialize stream frame");
            Event::default().data("{}")
        })
    }
}

impl From<JobEvent> for StreamFrame {
    fn from(event: JobEvent) -> Self {
        match event {
            JobEvent::Log(entry) => StreamFrame::from_entry(entry),
            JobEvent::Completed {
                status,
                exit_code,
                result,
            } => StreamFrame::Complete {
                status,
                exit_code,
                result,
            },
            JobEvent::Errored { message } => StreamFrame::Error { message },
        }
    }
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// GET /api/logs/{jobId}
///
/// Stream a job's log as Server-Sent Events. Unknown jobs fail with
/// 404 before any event is sent. For a job that already ended, the
/// backlog and terminal frame are replayed immediately and the stream
/// closes; no live registration occurs.
pub async fn stream_logs(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Sse<KeepAliveStream<BoxStream<'static, Result<Event, Infallible>>>>> {
    let subscription = state
        .registry
        .subscribe(&job_id)
        .await
        .ok_or(CoreError::NotFound {
            entity: "Job",
            id: job_id.clone(),
        })?;

    let stream = match subscription {
        JobSubscription::Finished { backlog, terminal } => {
            replay(job_id, backlog, Some(terminal)).boxed()
        }
        JobSubscription::Live { backlog, receiver } => replay(job_id.clone(), backlog, None)
            .chain(live(job_id, receiver))
            .boxed(),
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// The `connected` preamble, the backlog in append order, and (for
/// jobs that already ended) the terminal replay.
fn replay(
    job_id: String,
    backlog: Vec<LogEntry>,
    terminal: Option<JobEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let frames = std::iter::once(StreamFrame::Connected { job_id })
        .chain(backlog.into_iter().map(StreamFrame::from_entry))
        .chain(terminal.into_iter().map(StreamFrame::from));

    stream::iter(frames.map(|frame| Ok(frame.into_sse())))
}

/// Live events until (and including) the terminal frame.
///
/// A lagged receiver ends the stream instead of resuming with a gap:
/// the subscriber is dropped and can reattach for a consistent
/// backlog replay.
fn live(
    job_id: String,
    receiver: broadcast::Receiver<JobEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(receiver)
        .scan(false, move |done, item| {
            if *done {
                return future::ready(None);
            }

            let frame = match item {
                Ok(event) => {
                    if event.is_terminal() {
                        *done = true;
                    }
                    Some(StreamFrame::from(event))
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        job_id = %job_id,
                        skipped,
                        "Dropping lagged log subscriber",
                    );
                    *done = true;
                    None
                }
            };

            future::ready(Some(frame))
        })
        .filter_map(|frame| future::ready(frame.map(|f| Ok(f.into_sse()))))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
