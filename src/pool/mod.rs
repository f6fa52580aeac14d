//! Fixed-size worker pool.
//!
//! `W` long-lived tokio tasks created at startup and alive for the process
//! lifetime. Workers share nothing but the queue and the metrics; no worker
//! ever touches another worker's in-flight job.

mod worker;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::executor::Executor;
use crate::metrics::EngineMetrics;
use crate::queue::JobQueue;

/// Handle to the spawned workers; joined on drain shutdown.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `worker_count` workers consuming from `queue`.
    pub(crate) fn spawn<E: Executor>(
        worker_count: usize,
        queue: &Arc<JobQueue<E::Payload, E::Output>>,
        executor: Arc<E>,
        metrics: &Arc<EngineMetrics>,
        execution_timeout: Option<Duration>,
    ) -> Self {
        let handles = (0..worker_count)
            .map(|id| {
                let ctx = worker::WorkerContext {
                    id,
                    queue: Arc::clone(queue),
                    executor: Arc::clone(&executor),
                    metrics: Arc::clone(metrics),
                    execution_timeout,
                };
                tokio::spawn(worker::run(ctx))
            })
            .collect();
        Self { handles }
    }

    /// Number of workers spawned at startup.
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker to finish draining and exit.
    pub(crate) async fn join(self) {
        for handle in self.handles {
            if let Err(err) = handle.await {
                if err.is_panic() {
                    warn!("worker task panicked; effective capacity was reduced");
                }
            }
        }
    }
}
