//! Domain types shared across the atlasprint workspace.
//!
//! - [`error`]: the [`CoreError`](error::CoreError) taxonomy.
//! - [`job`]: job lifecycle types: status, log entries, results,
//!   summaries.
//! - [`poster`]: the poster generation request and its validation.

pub mod error;
pub mod job;
pub mod poster;

pub use error::CoreError;
pub use job::{JobStatus, JobSummary, LogChannel, LogEntry, PosterResult};
pub use poster::PosterConfig;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
