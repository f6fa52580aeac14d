//! Error types for the inference engine.
//!
//! Two failure classes are kept distinct at the boundary:
//!
//! - [`SubmitError`] — a **resource rejection**: the job never entered the
//!   queue and no worker will ever see it. Callers should back off and retry
//!   later (or route elsewhere).
//! - [`ExecuteError`] — an **execution failure**: the engine accepted the job
//!   and the executor failed on it. Retrying the same input may or may not
//!   help; that decision belongs to the caller.
//!
//! The engine itself never retries anything.

use std::time::Duration;

/// Why a submission was rejected at the admission gate.
///
/// A small closed set so metrics and tests can assert exact values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// The queue was at capacity at submission time.
    QueueFull,
    /// The engine is draining and no longer accepts work.
    Shutdown,
}

impl RejectReason {
    /// Stable snake_case label for logs and metric labels.
    pub fn as_label(&self) -> &'static str {
        match self {
            RejectReason::QueueFull => "queue_full",
            RejectReason::Shutdown => "shutdown",
        }
    }
}

/// Rejection returned by [`AdmissionGate::submit`](crate::AdmissionGate::submit).
///
/// A rejected job has no side effects: it was never enqueued and is never
/// counted as completed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// Queue at capacity; `max` is the admission window
    /// (`queue_capacity + worker_count`).
    #[error("queue is full (max outstanding: {max})")]
    QueueFull { max: usize },

    /// The engine is shutting down.
    #[error("engine is shutting down")]
    Shutdown,
}

impl SubmitError {
    /// The closed rejection reason, used as a metrics label.
    pub fn reason(&self) -> RejectReason {
        match self {
            SubmitError::QueueFull { .. } => RejectReason::QueueFull,
            SubmitError::Shutdown => RejectReason::Shutdown,
        }
    }
}

/// Failure of a job the engine did pick up.
///
/// Delivered through the job's response slot; distinct from [`SubmitError`]
/// so callers can tell "try again later" from "this input failed".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecuteError {
    /// The executor rejected the payload itself.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The model runtime failed while processing the job.
    #[error("model execution failed: {0}")]
    Model(String),

    /// The executor call exceeded the configured execution timeout.
    #[error("execution timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The worker crashed (panicked) while executing this job. Isolated to
    /// this job; other workers and the queue are unaffected.
    #[error("worker fault while executing the job")]
    WorkerFault,

    /// The response slot was dropped before a result was delivered. Only
    /// reachable if the engine is dropped without draining.
    #[error("job was dropped before a result was delivered")]
    Abandoned,
}

/// Terminal outcome of an executed job, used as the `completed_total` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Ok,
    Failed,
    Timeout,
    WorkerFault,
}

impl Outcome {
    /// Stable snake_case label for logs and metric labels.
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Failed => "failed",
            Outcome::Timeout => "timeout",
            Outcome::WorkerFault => "worker_fault",
        }
    }

    /// Classify an execution result.
    pub fn of<R>(result: &Result<R, ExecuteError>) -> Self {
        match result {
            Ok(_) => Outcome::Ok,
            Err(ExecuteError::Timeout { .. }) => Outcome::Timeout,
            Err(ExecuteError::WorkerFault) => Outcome::WorkerFault,
            Err(_) => Outcome::Failed,
        }
    }
}

/// Errors raised by engine construction.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration failed validation at startup.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
