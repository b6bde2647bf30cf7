//! Per-job event fan-out.
//!
//! This crate provides the live-streaming primitive of the engine:
//!
//! - [`JobEvent`]: one item on a job's event feed, either a captured
//!   log chunk or the single terminal notification.
//! - [`JobFeed`]: publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, one per job.

pub mod feed;

pub use feed::{JobEvent, JobFeed};
