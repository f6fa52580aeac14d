//! Engine composition root.
//!
//! Wires the queue, admission gate, worker pool, and metrics together, and
//! owns the drain shutdown sequence.

use std::sync::Arc;

use tracing::info;

use crate::config::EngineConfig;
use crate::error::{EngineError, SubmitError};
use crate::executor::Executor;
use crate::gate::AdmissionGate;
use crate::job::JobTicket;
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::pool::WorkerPool;
use crate::queue::JobQueue;

/// Admission-controlled inference engine.
///
/// Created once at startup with a fixed worker count and queue capacity;
/// neither is resized at runtime. Must be started from within a tokio
/// runtime.
pub struct Engine<E: Executor> {
    config: EngineConfig,
    queue: Arc<JobQueue<E::Payload, E::Output>>,
    gate: AdmissionGate<E::Payload, E::Output>,
    metrics: Arc<EngineMetrics>,
    pool: WorkerPool,
}

impl<E: Executor> Engine<E> {
    /// Validate the configuration, build the queue, and spawn the workers.
    pub fn start(config: EngineConfig, executor: E) -> Result<Self, EngineError> {
        config.validate()?;

        let metrics = Arc::new(EngineMetrics::new());
        let queue = Arc::new(JobQueue::new(config.queue_capacity, config.worker_count));
        let pool = WorkerPool::spawn(
            config.worker_count,
            &queue,
            Arc::new(executor),
            &metrics,
            config.execution_timeout,
        );
        let gate = AdmissionGate::new(Arc::clone(&queue), Arc::clone(&metrics));

        info!(
            workers = config.worker_count,
            queue_capacity = config.queue_capacity,
            execution_timeout = ?config.execution_timeout,
            "engine started"
        );

        Ok(Self {
            config,
            queue,
            gate,
            metrics,
            pool,
        })
    }

    /// Submit a payload through the admission gate.
    ///
    /// Non-blocking: returns immediately with a ticket or a rejection.
    pub fn submit(&self, payload: E::Payload) -> Result<JobTicket<E::Output>, SubmitError> {
        self.gate.submit(payload)
    }

    /// A clone of the admission gate, for handing to submission paths.
    pub fn gate(&self) -> AdmissionGate<E::Payload, E::Output> {
        self.gate.clone()
    }

    /// Engine metrics handle.
    pub fn metrics(&self) -> Arc<EngineMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Snapshot of the current metrics.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Approximate number of jobs currently waiting, within `[0, capacity]`.
    pub fn queue_depth(&self) -> usize {
        self.queue.depth()
    }

    /// The configuration the engine was started with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Drain shutdown.
    ///
    /// Stops accepting new jobs (late submissions are rejected with reason
    /// `shutdown`), lets every queued and in-flight job reach a terminal
    /// state, then joins all workers. When this returns, no worker tasks
    /// remain and every accepted job has been resolved.
    pub async fn shutdown(self) {
        info!(
            queued = self.queue.depth(),
            outstanding = self.queue.outstanding(),
            "engine shutdown: draining"
        );
        self.queue.close();
        self.pool.join().await;
        info!(
            completed = self.metrics.completed_total(),
            "engine shutdown complete"
        );
    }
}
