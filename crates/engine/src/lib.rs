//! Job execution engine.
//!
//! This crate owns the full job lifecycle:
//!
//! - [`registry`]: the in-memory [`JobRegistry`](registry::JobRegistry):
//!   id allocation, status snapshots, log backlog, subscription
//!   handoff, and TTL eviction of terminal jobs.
//! - [`runner`]: translating a [`PosterConfig`] into a worker argument
//!   vector, spawning the worker process, and pumping its output into
//!   the registry until exit.
//! - [`output`]: best-effort extraction of the rendered poster path
//!   from the worker's trailing log output.
//!
//! [`PosterConfig`]: atlasprint_core::poster::PosterConfig

pub mod output;
pub mod registry;
pub mod runner;

pub use registry::{JobRegistry, JobStatusInfo, JobSubscription};
pub use runner::WorkerConfig;
