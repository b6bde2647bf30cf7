//! In-memory job registry.
//!
//! [`JobRegistry`] is the single owner of all job state: it allocates
//! identifiers, stores the append-only log backlog, hands out live
//! subscriptions, and evicts terminal jobs after the retention window.
//! The handle is cheaply cloneable; all clones share one map.
//!
//! Consistency around the backlog boundary: [`append_log`] pushes the
//! entry and publishes it to the job's feed inside one write-lock
//! critical section, while [`subscribe`] snapshots the backlog and
//! takes its broadcast receiver under the read lock. The two sections
//! are mutually exclusive, so a subscriber can never miss an entry or
//! see one twice.
//!
//! [`append_log`]: JobRegistry::append_log
//! [`subscribe`]: JobRegistry::subscribe

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use rand::distr::Alphanumeric;
use rand::Rng;
use tokio::sync::{broadcast, RwLock};

use atlasprint_core::job::{JobStatus, JobSummary, LogChannel, LogEntry, PosterResult};
use atlasprint_core::poster::PosterConfig;
use atlasprint_events::{JobEvent, JobFeed};

use crate::output;

// ---------------------------------------------------------------------------
// Job record
// ---------------------------------------------------------------------------

/// Registry-private job record.
struct Job {
    status: JobStatus,
    exit_code: Option<i32>,
    config: PosterConfig,
    logs: Vec<LogEntry>,
    result: Option<PosterResult>,
    error_message: Option<String>,
    feed: JobFeed,
}

impl Job {
    fn new(config: PosterConfig) -> Self {
        Self {
            status: JobStatus::Running,
            exit_code: None,
            config,
            logs: Vec::new(),
            result: None,
            error_message: None,
            feed: JobFeed::default(),
        }
    }

    /// The single terminal event for this job's current state.
    ///
    /// Only meaningful once `status` is terminal.
    fn terminal_event(&self) -> JobEvent {
        match self.status {
            JobStatus::Error => JobEvent::Errored {
                message: self.error_message.clone().unwrap_or_default(),
            },
            _ => JobEvent::Completed {
                status: self.status,
                exit_code: self.exit_code,
                result: self.result.clone(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots handed to callers
// ---------------------------------------------------------------------------

/// Owned point-in-time view of a job, for the status endpoint.
#[derive(Debug, Clone)]
pub struct JobStatusInfo {
    pub status: JobStatus,
    pub exit_code: Option<i32>,
    pub result: Option<PosterResult>,
    pub error_message: Option<String>,
    pub log_count: usize,
}

/// What a new subscriber receives.
pub enum JobSubscription {
    /// The job is still running: the backlog so far plus a receiver
    /// for everything published afterwards.
    Live {
        backlog: Vec<LogEntry>,
        receiver: broadcast::Receiver<JobEvent>,
    },
    /// The job already ended: the full backlog plus a replay of its
    /// terminal event. No live registration occurs.
    Finished {
        backlog: Vec<LogEntry>,
        terminal: JobEvent,
    },
}

// ---------------------------------------------------------------------------
// JobRegistry
// ---------------------------------------------------------------------------

/// Shared, in-memory map of job id to job state.
#[derive(Clone)]
pub struct JobRegistry {
    jobs: Arc<RwLock<IndexMap<String, Job>>>,
    retention: Duration,
}

impl JobRegistry {
    /// Create a registry whose terminal jobs are purged `retention`
    /// after they end.
    pub fn new(retention: Duration) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(IndexMap::new())),
            retention,
        }
    }

    /// Allocate a fresh job in the `running` state and return its id.
    pub async fn create(&self, config: PosterConfig) -> String {
        let job_id = new_job_id();
        self.jobs
            .write()
            .await
            .insert(job_id.clone(), Job::new(config));

        tracing::info!(job_id = %job_id, "Job created");
        job_id
    }

    /// Owned status snapshot, or `None` for unknown/evicted ids.
    pub async fn status(&self, job_id: &str) -> Option<JobStatusInfo> {
        let jobs = self.jobs.read().await;
        let job = jobs.get(job_id)?;

        Some(JobStatusInfo {
            status: job.status,
            exit_code: job.exit_code,
            result: job.result.clone(),
            error_message: job.error_message.clone(),
            log_count: job.logs.len(),
        })
    }

    /// The immutable configuration a job was created with.
    pub async fn config(&self, job_id: &str) -> Option<PosterConfig> {
        let jobs = self.jobs.read().await;
        Some(jobs.get(job_id)?.config.clone())
    }

    /// Summaries of all known jobs, in creation order.
    pub async fn list(&self) -> Vec<JobSummary> {
        let jobs = self.jobs.read().await;
        jobs.iter()
            .map(|(job_id, job)| JobSummary {
                job_id: job_id.clone(),
                status: job.status,
                config: job.config.clone(),
                log_count: job.logs.len(),
            })
            .collect()
    }

    /// Number of jobs currently tracked (running or awaiting eviction).
    pub async fn active_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Attach a subscriber to a job's event feed.
    ///
    /// Running jobs yield the backlog plus a live receiver; terminal
    /// jobs yield the backlog plus a terminal-event replay. Returns
    /// `None` for unknown ids.
    pub async fn subscribe(&self, job_id: &str) -> Option<JobSubscription> {
        let jobs = self.jobs.read().await;
        let job = jobs.get(job_id)?;
        let backlog = job.logs.clone();

        if job.status.is_terminal() {
            Some(JobSubscription::Finished {
                backlog,
                terminal: job.terminal_event(),
            })
        } else {
            Some(JobSubscription::Live {
                backlog,
                receiver: job.feed.subscribe(),
            })
        }
    }

    /// Append one captured output chunk and fan it out to subscribers.
    ///
    /// No-op for unknown ids (the job may already have been evicted).
    pub async fn append_log(&self, job_id: &str, channel: LogChannel, message: String) {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(job_id) else {
            return;
        };

        let entry = LogEntry::now(channel, message);
        job.logs.push(entry.clone());
        job.feed.publish(JobEvent::Log(entry));
    }

    /// Drive a job to `completed` or `failed` from its worker exit code.
    ///
    /// Publishes the job's single terminal event and arms the eviction
    /// timer. On exit code 0 the log tail is scanned for a result path;
    /// an unrecognized tail leaves `result` empty while the status is
    /// still `completed`.
    pub async fn finish(&self, job_id: &str, exit_code: i32) {
        {
            let mut jobs = self.jobs.write().await;
            let Some(job) = jobs.get_mut(job_id) else {
                return;
            };
            if job.status.is_terminal() {
                return;
            }

            job.status = if exit_code == 0 {
                JobStatus::Completed
            } else {
                JobStatus::Failed
            };
            job.exit_code = Some(exit_code);

            if exit_code == 0 {
                job.result = output::extract_result(&job.logs);
            }

            tracing::info!(
                job_id = %job_id,
                exit_code,
                status = ?job.status,
                subscribers = job.feed.subscriber_count(),
                "Worker exited",
            );

            job.feed.publish(job.terminal_event());
        }

        self.schedule_eviction(job_id.to_string());
    }

    /// Drive a job to the `error` state with a descriptive message.
    ///
    /// Used when the worker could not be started (or waited on); the
    /// terminal event and eviction behave as in [`finish`](Self::finish).
    pub async fn fail(&self, job_id: &str, message: String) {
        {
            let mut jobs = self.jobs.write().await;
            let Some(job) = jobs.get_mut(job_id) else {
                return;
            };
            if job.status.is_terminal() {
                return;
            }

            job.status = JobStatus::Error;
            job.error_message = Some(message);

            tracing::error!(
                job_id = %job_id,
                error = %job.error_message.as_deref().unwrap_or_default(),
                "Job errored",
            );

            job.feed.publish(job.terminal_event());
        }

        self.schedule_eviction(job_id.to_string());
    }

    /// Arm the one-shot eviction timer for a terminal job.
    ///
    /// Fires once after the retention window and removes the job and
    /// its logs entirely; it cannot be re-armed or cancelled.
    fn schedule_eviction(&self, job_id: String) {
        let registry = self.clone();
        let ttl = self.retention;

        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if registry.jobs.write().await.shift_remove(&job_id).is_some() {
                tracing::debug!(job_id = %job_id, "Job evicted after retention window");
            }
        });
    }
}

/// Allocate a job identifier: unix millis plus a random alphanumeric
/// suffix. Collision-free in practice; ids are never reused.
fn new_job_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();

    format!("{}-{}", chrono::Utc::now().timestamp_millis(), suffix)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
