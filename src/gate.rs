//! Admission gate: the single entry point for new work.
//!
//! `submit` decides accept/reject in bounded, effectively constant time and
//! never suspends, regardless of load. A blocking admission path under
//! overload would feed a loop of growing latency and caller retries; failing
//! fast is the core property this component exists for.

use std::sync::Arc;

use tracing::debug;

use crate::error::SubmitError;
use crate::job::{Job, JobTicket};
use crate::metrics::prometheus as prom;
use crate::metrics::EngineMetrics;
use crate::queue::JobQueue;

/// Non-blocking admission front for the job queue.
///
/// Cheap to clone; hand one to every submission path. Safe under concurrent
/// calls — the queue's short critical section is the only serialization.
pub struct AdmissionGate<T, R> {
    queue: Arc<JobQueue<T, R>>,
    metrics: Arc<EngineMetrics>,
}

impl<T, R> Clone for AdmissionGate<T, R> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<T, R> AdmissionGate<T, R> {
    pub(crate) fn new(queue: Arc<JobQueue<T, R>>, metrics: Arc<EngineMetrics>) -> Self {
        Self { queue, metrics }
    }

    /// Submit a payload for execution.
    ///
    /// On acceptance, ownership of the job passes to the queue and the
    /// returned [`JobTicket`] resolves once a worker delivers the outcome.
    /// On rejection the job is dropped before any worker can see it and the
    /// rejection counter increments exactly once.
    pub fn submit(&self, payload: T) -> Result<JobTicket<R>, SubmitError> {
        self.metrics.record_submission();
        prom::record_submission();

        let (job, ticket) = Job::new(payload);
        let id = job.id();

        match self.queue.try_enqueue(job) {
            Ok(()) => {
                let depth = self.queue.depth();
                self.metrics.record_accepted(depth as u64);
                prom::record_accepted();
                prom::set_queue_depth(depth);
                debug!(job_id = id, depth, "job accepted");
                Ok(ticket)
            }
            Err(err) => {
                let reason = err.reason();
                self.metrics.record_rejected(reason);
                prom::record_rejected(reason);
                debug!(job_id = id, reason = reason.as_label(), "job rejected");
                Err(err)
            }
        }
    }

    /// Approximate number of jobs currently waiting.
    pub fn queue_depth(&self) -> usize {
        self.queue.depth()
    }
}
