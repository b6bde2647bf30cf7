//! Per-job broadcast feed backed by a `tokio::sync::broadcast` channel.
//!
//! Every job owns one [`JobFeed`]. The process runner publishes into
//! it; any number of transport subscribers receive every event
//! independently. A subscriber is just a broadcast receiver, so
//! detaching is dropping the receiver and a slow consumer can lag
//! past the channel capacity without ever blocking the producer.

use tokio::sync::broadcast;

use atlasprint_core::job::{JobStatus, LogEntry, PosterResult};

// ---------------------------------------------------------------------------
// JobEvent
// ---------------------------------------------------------------------------

/// One item on a job's live feed.
///
/// A feed carries any number of `Log` events followed by exactly one
/// terminal event (`Completed` or `Errored`), which is the last event
/// any subscriber receives for that job.
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// A captured chunk of worker output.
    Log(LogEntry),

    /// The worker exited. `status` is `Completed` or `Failed`
    /// depending on the exit code; `result` is only ever present on
    /// `Completed`.
    Completed {
        status: JobStatus,
        exit_code: Option<i32>,
        result: Option<PosterResult>,
    },

    /// The worker could never be started.
    Errored { message: String },
}

impl JobEvent {
    /// Whether this event ends the feed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobEvent::Log(_))
    }
}

// ---------------------------------------------------------------------------
// JobFeed
// ---------------------------------------------------------------------------

/// Default buffer capacity for a job's broadcast channel.
///
/// A receiver that falls more than this many events behind observes
/// `RecvError::Lagged` and is dropped by the transport layer.
const DEFAULT_CAPACITY: usize = 256;

/// Fan-out hub for a single job's events.
pub struct JobFeed {
    sender: broadcast::Sender<JobEvent>,
}

impl JobFeed {
    /// Create a feed with a specific channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently
    /// dropped; the registry's backlog is the durable copy.
    pub fn publish(&self, event: JobEvent) {
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.sender.subscribe()
    }

    /// Number of currently attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for JobFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
