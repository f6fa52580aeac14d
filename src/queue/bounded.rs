//! Fixed-capacity MPMC FIFO queue with non-blocking enqueue.
//!
//! Invariants:
//! - At most `capacity + worker_slots` jobs are outstanding (accepted but not
//!   yet terminal). With all workers busy this caps the waiting segment at
//!   `capacity`; with `capacity = 0` it means "accept no more than in-flight
//!   capacity".
//! - FIFO order among enqueued jobs.
//! - No job is duplicated, lost, or double-delivered under any interleaving
//!   of enqueue, dequeue, and close.
//!
//! The mutex is a `std::sync::Mutex` held only for short push/pop sections
//! and never across an await, so `try_enqueue` runs in effectively constant
//! time regardless of load. Workers park on a `Notify` when the queue is
//! empty; that is the only suspension point in the engine.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tracing::debug;

use crate::error::SubmitError;
use crate::job::Job;

/// Bounded multi-producer/multi-consumer job queue.
pub struct JobQueue<T, R> {
    inner: Mutex<Inner<T, R>>,
    notify: Notify,
    capacity: usize,
    worker_slots: usize,
    /// Mirror of the deque length for lock-free gauge reads.
    queued_len: AtomicUsize,
}

struct Inner<T, R> {
    jobs: VecDeque<Job<T, R>>,
    /// Accepted jobs not yet terminal: queued plus executing.
    outstanding: usize,
    closed: bool,
}

impl<T, R> JobQueue<T, R> {
    /// Create a queue with fixed `capacity` waiting slots plus
    /// `worker_slots` in-flight slots.
    pub fn new(capacity: usize, worker_slots: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                jobs: VecDeque::with_capacity(capacity),
                outstanding: 0,
                closed: false,
            }),
            notify: Notify::new(),
            capacity,
            worker_slots,
            queued_len: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T, R>> {
        // A poisoned lock only means a panic elsewhere; the data is still
        // consistent because every critical section is a plain push/pop.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configured waiting capacity `C`.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Admission window: `capacity + worker_slots` outstanding jobs.
    pub fn max_outstanding(&self) -> usize {
        self.capacity + self.worker_slots
    }

    /// Attempt to enqueue without blocking.
    ///
    /// Either succeeds immediately or fails immediately; no spin-wait, no
    /// partial insert. On failure the job is dropped before any worker can
    /// observe it.
    pub fn try_enqueue(&self, job: Job<T, R>) -> Result<(), SubmitError> {
        let max = self.max_outstanding();
        {
            let mut inner = self.lock();
            if inner.closed {
                return Err(SubmitError::Shutdown);
            }
            if inner.outstanding >= max {
                return Err(SubmitError::QueueFull { max });
            }
            inner.outstanding += 1;
            inner.jobs.push_back(job);
            self.queued_len.store(inner.jobs.len(), Ordering::Relaxed);
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Wait for the next job.
    ///
    /// Suspends the calling worker (and only the worker) while the queue is
    /// empty. Returns `None` once the queue is closed and fully drained.
    pub async fn dequeue(&self) -> Option<Job<T, R>> {
        loop {
            // Register for a wakeup before checking, so a notify between the
            // check and the await cannot be lost.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut inner = self.lock();
                if let Some(job) = inner.jobs.pop_front() {
                    self.queued_len.store(inner.jobs.len(), Ordering::Relaxed);
                    return Some(job);
                }
                if inner.closed {
                    return None;
                }
            }

            notified.as_mut().await;
        }
    }

    /// Release the slot held by a job that reached a terminal state.
    pub fn release(&self) {
        let mut inner = self.lock();
        debug_assert!(inner.outstanding > 0, "release without outstanding job");
        inner.outstanding = inner.outstanding.saturating_sub(1);
    }

    /// Stop accepting new jobs and wake all parked workers.
    ///
    /// Jobs already queued remain dequeueable so they can be drained.
    pub fn close(&self) {
        {
            let mut inner = self.lock();
            if inner.closed {
                return;
            }
            inner.closed = true;
            debug!(
                queued = inner.jobs.len(),
                outstanding = inner.outstanding,
                "queue closed for drain"
            );
        }
        self.notify.notify_waiters();
    }

    /// Whether the queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Approximate number of jobs waiting, clamped to `[0, capacity]`.
    ///
    /// Momentarily stale reads are fine; the clamp covers the short handoff
    /// window where an accepted job sits in the deque while an idle worker
    /// is on its way to pick it up.
    pub fn depth(&self) -> usize {
        self.queued_len.load(Ordering::Relaxed).min(self.capacity)
    }

    /// Accepted jobs not yet terminal (queued plus executing).
    pub fn outstanding(&self) -> usize {
        self.lock().outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobTicket;

    fn make_job(n: u64) -> (Job<u64, u64>, JobTicket<u64>) {
        Job::new(n)
    }

    #[tokio::test]
    async fn test_enqueue_dequeue() {
        let queue: JobQueue<u64, u64> = JobQueue::new(4, 0);

        let (job, _ticket) = make_job(7);
        queue.try_enqueue(job).unwrap();
        assert_eq!(queue.depth(), 1);
        assert_eq!(queue.outstanding(), 1);

        let job = queue.dequeue().await.unwrap();
        assert_eq!(job.payload, 7);
        assert_eq!(queue.depth(), 0);
        // Slot stays held until the job is terminal.
        assert_eq!(queue.outstanding(), 1);
        queue.release();
        assert_eq!(queue.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_queue_full() {
        let queue: JobQueue<u64, u64> = JobQueue::new(2, 0);

        let (a, _ta) = make_job(1);
        let (b, _tb) = make_job(2);
        queue.try_enqueue(a).unwrap();
        queue.try_enqueue(b).unwrap();

        let (c, _tc) = make_job(3);
        assert_eq!(
            queue.try_enqueue(c),
            Err(SubmitError::QueueFull { max: 2 })
        );
    }

    #[tokio::test]
    async fn test_worker_slots_extend_admission_window() {
        // capacity 0 with 2 worker slots accepts exactly 2 outstanding jobs.
        let queue: JobQueue<u64, u64> = JobQueue::new(0, 2);

        let (a, _ta) = make_job(1);
        let (b, _tb) = make_job(2);
        queue.try_enqueue(a).unwrap();
        queue.try_enqueue(b).unwrap();

        let (c, _tc) = make_job(3);
        assert!(matches!(
            queue.try_enqueue(c),
            Err(SubmitError::QueueFull { .. })
        ));
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let queue: JobQueue<u64, u64> = JobQueue::new(8, 0);
        let mut tickets = Vec::new();

        for n in 0..5 {
            let (job, ticket) = make_job(n);
            queue.try_enqueue(job).unwrap();
            tickets.push(ticket);
        }

        for expected in 0..5 {
            let job = queue.dequeue().await.unwrap();
            assert_eq!(job.payload, expected);
            queue.release();
        }
    }

    #[tokio::test]
    async fn test_release_unblocks_admission() {
        let queue: JobQueue<u64, u64> = JobQueue::new(1, 0);

        let (a, _ta) = make_job(1);
        queue.try_enqueue(a).unwrap();
        let (b, _tb) = make_job(2);
        assert!(queue.try_enqueue(b).is_err());

        // Dequeue alone is not terminal; the slot is still held.
        let _job = queue.dequeue().await.unwrap();
        let (c, _tc) = make_job(3);
        assert!(queue.try_enqueue(c).is_err());

        queue.release();
        let (d, _td) = make_job(4);
        assert!(queue.try_enqueue(d).is_ok());
    }

    #[tokio::test]
    async fn test_close_rejects_new_jobs() {
        let queue: JobQueue<u64, u64> = JobQueue::new(4, 0);
        queue.close();

        let (job, _ticket) = make_job(1);
        assert_eq!(queue.try_enqueue(job), Err(SubmitError::Shutdown));
        assert!(queue.is_closed());
    }

    #[tokio::test]
    async fn test_close_drains_queued_jobs() {
        let queue: JobQueue<u64, u64> = JobQueue::new(4, 0);
        let (a, _ta) = make_job(1);
        let (b, _tb) = make_job(2);
        queue.try_enqueue(a).unwrap();
        queue.try_enqueue(b).unwrap();

        queue.close();

        // Already-queued jobs stay dequeueable after close.
        assert_eq!(queue.dequeue().await.unwrap().payload, 1);
        queue.release();
        assert_eq!(queue.dequeue().await.unwrap().payload, 2);
        queue.release();
        assert!(queue.dequeue().await.is_none());
    }

    #[tokio::test]
    async fn test_dequeue_wakes_on_enqueue() {
        use std::sync::Arc;

        let queue: Arc<JobQueue<u64, u64>> = Arc::new(JobQueue::new(4, 0));

        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.dequeue().await.map(|j| j.payload) })
        };

        // Give the consumer a chance to park before producing.
        tokio::task::yield_now().await;
        let (job, _ticket) = make_job(9);
        queue.try_enqueue(job).unwrap();

        assert_eq!(consumer.await.unwrap(), Some(9));
    }

    #[tokio::test]
    async fn test_close_wakes_parked_workers() {
        use std::sync::Arc;

        let queue: Arc<JobQueue<u64, u64>> = Arc::new(JobQueue::new(4, 0));

        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.dequeue().await.map(|j| j.payload) })
        };

        tokio::task::yield_now().await;
        queue.close();

        assert_eq!(consumer.await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_depth_never_exceeds_capacity() {
        // Worker slots widen admission but the reported depth stays in [0, C].
        let queue: JobQueue<u64, u64> = JobQueue::new(1, 2);

        let mut tickets = Vec::new();
        for n in 0..3 {
            let (job, ticket) = make_job(n);
            queue.try_enqueue(job).unwrap();
            tickets.push(ticket);
        }

        assert_eq!(queue.outstanding(), 3);
        assert!(queue.depth() <= queue.capacity());
    }
}
