//! The worker execution loop.
//!
//! Each worker repeatedly dequeues one job, invokes the executor inside a
//! spawned child task, and delivers the outcome to the job's response slot.
//! Running the executor in its own task isolates faults: a panicking
//! executor fails only the job that triggered it, and the worker slot
//! restarts for the next job. A hung executor is cut off by the configured
//! execution timeout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinError;
use tracing::{debug, warn};

use crate::error::{ExecuteError, Outcome};
use crate::executor::Executor;
use crate::job::Job;
use crate::metrics::prometheus as prom;
use crate::metrics::EngineMetrics;
use crate::queue::JobQueue;

/// Everything a single worker needs; moved into its task at spawn time.
pub(crate) struct WorkerContext<E: Executor> {
    pub(crate) id: usize,
    pub(crate) queue: Arc<JobQueue<E::Payload, E::Output>>,
    pub(crate) executor: Arc<E>,
    pub(crate) metrics: Arc<EngineMetrics>,
    pub(crate) execution_timeout: Option<Duration>,
}

/// Keeps the workers-alive gauge honest even if the worker task unwinds.
struct AliveGuard {
    metrics: Arc<EngineMetrics>,
}

impl AliveGuard {
    fn new(metrics: Arc<EngineMetrics>) -> Self {
        metrics.record_worker_started();
        prom::record_worker_started();
        Self { metrics }
    }
}

impl Drop for AliveGuard {
    fn drop(&mut self) {
        self.metrics.record_worker_stopped();
        prom::record_worker_stopped();
    }
}

/// Worker main loop: dequeue, execute, deliver, repeat until drained.
pub(crate) async fn run<E: Executor>(ctx: WorkerContext<E>) {
    let _alive = AliveGuard::new(Arc::clone(&ctx.metrics));
    debug!(worker_id = ctx.id, "worker started");

    while let Some(job) = ctx.queue.dequeue().await {
        let wait = job.queue_wait();
        ctx.metrics.record_dequeued(wait);
        prom::observe_queue_wait(wait);
        prom::set_queue_depth(ctx.queue.depth());

        execute_one(&ctx, job).await;
    }

    debug!(worker_id = ctx.id, "queue drained, worker exiting");
}

/// Run a single job to a terminal state and deliver the result.
async fn execute_one<E: Executor>(ctx: &WorkerContext<E>, job: Job<E::Payload, E::Output>) {
    let Job {
        id,
        payload,
        responder,
        ..
    } = job;
    let started = Instant::now();

    let executor = Arc::clone(&ctx.executor);
    let handle = tokio::spawn(async move { executor.execute(payload).await });
    let abort = handle.abort_handle();

    let result = match ctx.execution_timeout {
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(joined) => unwrap_join(ctx, id, joined),
            Err(_) => {
                abort.abort();
                warn!(
                    worker_id = ctx.id,
                    job_id = id,
                    timeout = ?limit,
                    "execution timed out"
                );
                Err(ExecuteError::Timeout { timeout: limit })
            }
        },
        None => unwrap_join(ctx, id, handle.await),
    };

    let execution = started.elapsed();
    let outcome = Outcome::of(&result);
    ctx.metrics.record_completed(outcome, execution);
    prom::record_completed(outcome, execution);
    debug!(
        worker_id = ctx.id,
        job_id = id,
        outcome = outcome.as_label(),
        elapsed_ms = execution.as_millis() as u64,
        "job completed"
    );

    // Free the slot before delivering, so a caller that has seen the result
    // can immediately submit again.
    ctx.queue.release();

    if responder.send(result).is_err() {
        debug!(job_id = id, "caller abandoned job before completion");
    }
}

fn unwrap_join<E: Executor>(
    ctx: &WorkerContext<E>,
    id: u64,
    joined: Result<Result<E::Output, ExecuteError>, JoinError>,
) -> Result<E::Output, ExecuteError> {
    match joined {
        Ok(result) => result,
        Err(err) if err.is_panic() => {
            ctx.metrics.record_worker_fault();
            prom::record_worker_fault();
            warn!(
                worker_id = ctx.id,
                job_id = id,
                "executor panicked; slot restarted"
            );
            Err(ExecuteError::WorkerFault)
        }
        // Aborted child task; surfaced as a fault so the slot is never
        // left unresolved.
        Err(_) => Err(ExecuteError::WorkerFault),
    }
}
