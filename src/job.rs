//! The unit of work flowing through the engine.
//!
//! A [`Job`] pairs an opaque payload with a single-use response slot. The
//! accepted caller holds the [`JobTicket`] end of the slot; exactly one of
//! a result or a typed execution failure is delivered through it. A job that
//! is rejected before enqueue has no ticket and its slot is never filled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::oneshot;

use crate::error::ExecuteError;

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(0);

/// A submitted unit of work awaiting execution.
///
/// Enqueued at most once, dequeued at most once; the dequeuing worker owns
/// all state transitions from then on.
pub struct Job<T, R> {
    pub(crate) id: u64,
    pub(crate) payload: T,
    pub(crate) submitted_at: Instant,
    pub(crate) responder: oneshot::Sender<Result<R, ExecuteError>>,
}

impl<T, R> Job<T, R> {
    /// Create a job and the caller-side ticket for its response slot.
    pub(crate) fn new(payload: T) -> (Self, JobTicket<R>) {
        let id = NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        let job = Self {
            id,
            payload,
            submitted_at: Instant::now(),
            responder: tx,
        };
        (job, JobTicket { id, rx })
    }

    /// Unique id assigned at submission time.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Time elapsed since submission.
    pub fn queue_wait(&self) -> Duration {
        self.submitted_at.elapsed()
    }
}

/// Caller-side handle for an accepted job.
///
/// Await [`wait`](Self::wait) for the outcome, or drop the ticket to abandon
/// interest — the job still runs to completion either way.
#[derive(Debug)]
pub struct JobTicket<R> {
    id: u64,
    rx: oneshot::Receiver<Result<R, ExecuteError>>,
}

impl<R> JobTicket<R> {
    /// Id of the job this ticket belongs to.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the job to reach a terminal state.
    ///
    /// Returns [`ExecuteError::Abandoned`] if the response slot was dropped
    /// before a result was delivered, which can only happen if the engine is
    /// dropped without draining.
    pub async fn wait(self) -> Result<R, ExecuteError> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(ExecuteError::Abandoned),
        }
    }
}
