//! Job lifecycle types.
//!
//! A job is one invocation of the external rendering worker. It starts
//! `running` and moves exactly once to one of three terminal states;
//! its captured output is an append-only sequence of [`LogEntry`]s.

use serde::{Deserialize, Serialize};

use crate::poster::PosterConfig;
use crate::Timestamp;

/// Lifecycle state of a job.
///
/// `Running` is the only initial state. The other three are terminal
/// and mutually exclusive; there are no backward transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// The worker process is still producing output.
    Running,
    /// The worker exited with code 0.
    Completed,
    /// The worker exited with a nonzero code.
    Failed,
    /// The worker could not be started at all.
    Error,
}

impl JobStatus {
    /// Whether this state has no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Running)
    }
}

/// Which worker output stream a log entry arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogChannel {
    Stdout,
    Stderr,
}

/// One captured chunk of worker output, timestamped at arrival.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub channel: LogChannel,
    pub message: String,
    pub timestamp: Timestamp,
}

impl LogEntry {
    /// Create an entry stamped with the current time.
    pub fn now(channel: LogChannel, message: impl Into<String>) -> Self {
        Self {
            channel,
            message: message.into(),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Reference to the rendered poster, extracted from the worker's
/// trailing output on successful completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosterResult {
    /// Bare output file name, e.g. `tokyo-42.png`.
    pub filename: String,
    /// Public path the file is served from, e.g. `/posters/tokyo-42.png`.
    pub url: String,
}

/// Compact per-job row for the operational job listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub job_id: String,
    pub status: JobStatus,
    pub config: PosterConfig,
    pub log_count: usize,
}
