//! In-process engine metrics.
//!
//! Atomic counters updated exactly once per admission outcome and per
//! completion. This is the source of truth the accounting properties are
//! asserted against; the Prometheus layer mirrors these values for scraping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::{Outcome, RejectReason};

/// Metrics for monitoring engine behavior.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Total submissions seen by the admission gate.
    pub submissions: AtomicU64,

    /// Submissions accepted into the queue.
    pub accepted: AtomicU64,

    /// Submissions rejected because the queue was full.
    pub rejected_queue_full: AtomicU64,

    /// Submissions rejected because the engine was draining.
    pub rejected_shutdown: AtomicU64,

    /// Jobs currently executing on a worker.
    pub executing: AtomicU64,

    /// Jobs completed successfully.
    pub completed_ok: AtomicU64,

    /// Jobs that failed in the executor.
    pub completed_failed: AtomicU64,

    /// Jobs that exceeded the execution timeout.
    pub completed_timeout: AtomicU64,

    /// Jobs lost to a worker fault (panic).
    pub completed_fault: AtomicU64,

    /// Worker faults observed (each also restarts the affected slot).
    pub worker_faults: AtomicU64,

    /// Workers currently alive.
    pub workers_alive: AtomicU64,

    /// Total queue wait in milliseconds (for averaging).
    pub total_queue_wait_ms: AtomicU64,

    /// Total execution time in milliseconds (for averaging).
    pub total_execution_ms: AtomicU64,

    /// Maximum queue depth observed.
    pub max_queue_depth: AtomicU64,
}

impl EngineMetrics {
    /// Create a new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submission hitting the admission gate.
    pub fn record_submission(&self) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an accepted submission and the queue depth it observed.
    pub fn record_accepted(&self, depth: u64) {
        self.accepted.fetch_add(1, Ordering::Relaxed);

        let mut current_max = self.max_queue_depth.load(Ordering::Relaxed);
        while depth > current_max {
            match self.max_queue_depth.compare_exchange_weak(
                current_max,
                depth,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(x) => current_max = x,
            }
        }
    }

    /// Record a rejected submission.
    pub fn record_rejected(&self, reason: RejectReason) {
        match reason {
            RejectReason::QueueFull => &self.rejected_queue_full,
            RejectReason::Shutdown => &self.rejected_shutdown,
        }
        .fetch_add(1, Ordering::Relaxed);
    }

    /// Record a job leaving the queue for a worker.
    pub fn record_dequeued(&self, wait: Duration) {
        self.executing.fetch_add(1, Ordering::Relaxed);
        self.total_queue_wait_ms
            .fetch_add(wait.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record a job reaching a terminal state.
    pub fn record_completed(&self, outcome: Outcome, execution: Duration) {
        self.executing.fetch_sub(1, Ordering::Relaxed);
        self.total_execution_ms
            .fetch_add(execution.as_millis() as u64, Ordering::Relaxed);
        match outcome {
            Outcome::Ok => &self.completed_ok,
            Outcome::Failed => &self.completed_failed,
            Outcome::Timeout => &self.completed_timeout,
            Outcome::WorkerFault => &self.completed_fault,
        }
        .fetch_add(1, Ordering::Relaxed);
    }

    /// Record a worker fault (panic during execution).
    pub fn record_worker_fault(&self) {
        self.worker_faults.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a worker starting.
    pub fn record_worker_started(&self) {
        self.workers_alive.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a worker exiting (drain or crash).
    pub fn record_worker_stopped(&self) {
        self.workers_alive.fetch_sub(1, Ordering::Relaxed);
    }

    /// Total rejections across all reasons.
    pub fn rejected_total(&self) -> u64 {
        self.rejected_queue_full.load(Ordering::Relaxed)
            + self.rejected_shutdown.load(Ordering::Relaxed)
    }

    /// Total completions across all outcomes.
    pub fn completed_total(&self) -> u64 {
        self.completed_ok.load(Ordering::Relaxed)
            + self.completed_failed.load(Ordering::Relaxed)
            + self.completed_timeout.load(Ordering::Relaxed)
            + self.completed_fault.load(Ordering::Relaxed)
    }

    /// Average queue wait in milliseconds over all dequeued jobs.
    pub fn avg_queue_wait_ms(&self) -> f64 {
        let completed = self.completed_total();
        if completed == 0 {
            return 0.0;
        }
        self.total_queue_wait_ms.load(Ordering::Relaxed) as f64 / completed as f64
    }

    /// Average execution time in milliseconds over all completed jobs.
    pub fn avg_execution_ms(&self) -> f64 {
        let completed = self.completed_total();
        if completed == 0 {
            return 0.0;
        }
        self.total_execution_ms.load(Ordering::Relaxed) as f64 / completed as f64
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submissions_total: self.submissions.load(Ordering::Relaxed),
            accepted_total: self.accepted.load(Ordering::Relaxed),
            rejected_queue_full: self.rejected_queue_full.load(Ordering::Relaxed),
            rejected_shutdown: self.rejected_shutdown.load(Ordering::Relaxed),
            rejected_total: self.rejected_total(),
            executing: self.executing.load(Ordering::Relaxed),
            completed_ok: self.completed_ok.load(Ordering::Relaxed),
            completed_failed: self.completed_failed.load(Ordering::Relaxed),
            completed_timeout: self.completed_timeout.load(Ordering::Relaxed),
            completed_fault: self.completed_fault.load(Ordering::Relaxed),
            completed_total: self.completed_total(),
            worker_faults: self.worker_faults.load(Ordering::Relaxed),
            workers_alive: self.workers_alive.load(Ordering::Relaxed),
            max_queue_depth: self.max_queue_depth.load(Ordering::Relaxed),
            avg_queue_wait_ms: self.avg_queue_wait_ms(),
            avg_execution_ms: self.avg_execution_ms(),
        }
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSnapshot {
    pub submissions_total: u64,
    pub accepted_total: u64,
    pub rejected_queue_full: u64,
    pub rejected_shutdown: u64,
    pub rejected_total: u64,
    pub executing: u64,
    pub completed_ok: u64,
    pub completed_failed: u64,
    pub completed_timeout: u64,
    pub completed_fault: u64,
    pub completed_total: u64,
    pub worker_faults: u64,
    pub workers_alive: u64,
    pub max_queue_depth: u64,
    pub avg_queue_wait_ms: f64,
    pub avg_execution_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_accounting() {
        let metrics = EngineMetrics::new();

        metrics.record_submission();
        metrics.record_accepted(1);
        metrics.record_submission();
        metrics.record_rejected(RejectReason::QueueFull);
        metrics.record_submission();
        metrics.record_rejected(RejectReason::Shutdown);

        let snap = metrics.snapshot();
        assert_eq!(snap.submissions_total, 3);
        assert_eq!(snap.accepted_total, 1);
        assert_eq!(snap.rejected_queue_full, 1);
        assert_eq!(snap.rejected_shutdown, 1);
        assert_eq!(snap.accepted_total + snap.rejected_total, snap.submissions_total);
    }

    #[test]
    fn test_completion_accounting() {
        let metrics = EngineMetrics::new();

        metrics.record_dequeued(Duration::from_millis(100));
        assert_eq!(metrics.executing.load(Ordering::Relaxed), 1);

        metrics.record_completed(Outcome::Ok, Duration::from_millis(500));
        assert_eq!(metrics.executing.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.completed_total(), 1);
        assert_eq!(metrics.avg_queue_wait_ms(), 100.0);
        assert_eq!(metrics.avg_execution_ms(), 500.0);
    }

    #[test]
    fn test_max_queue_depth_high_water_mark() {
        let metrics = EngineMetrics::new();

        for depth in [1, 3, 5, 2, 4] {
            metrics.record_accepted(depth);
        }
        assert_eq!(metrics.max_queue_depth.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_worker_lifecycle_gauge() {
        let metrics = EngineMetrics::new();

        metrics.record_worker_started();
        metrics.record_worker_started();
        assert_eq!(metrics.workers_alive.load(Ordering::Relaxed), 2);

        metrics.record_worker_stopped();
        assert_eq!(metrics.workers_alive.load(Ordering::Relaxed), 1);
    }
}
