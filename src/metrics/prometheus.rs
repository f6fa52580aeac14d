//! Prometheus metrics for the inference engine.
//!
//! Pull-based exposition in Prometheus text format. The HTTP scrape endpoint
//! itself lives outside this crate; callers serve [`encode_metrics`] from
//! wherever their transport is.

use std::time::Duration;

use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};

use crate::error::{Outcome, RejectReason};

lazy_static! {
    /// Global Prometheus registry for engine metrics.
    pub static ref REGISTRY: Registry = Registry::new();

    /// Total submissions seen by the admission gate.
    pub static ref SUBMISSIONS_TOTAL: Counter = Counter::with_opts(
        Opts::new("submissions_total", "Total jobs submitted to the admission gate")
            .namespace("inferq")
    ).expect("metric can be created");

    /// Total accepted submissions.
    pub static ref ACCEPTED_TOTAL: Counter = Counter::with_opts(
        Opts::new("accepted_total", "Total jobs accepted into the queue")
            .namespace("inferq")
    ).expect("metric can be created");

    /// Total rejected submissions, by reason.
    pub static ref REJECTED_TOTAL: CounterVec = CounterVec::new(
        Opts::new("rejected_total", "Total jobs rejected at admission")
            .namespace("inferq"),
        &["reason"]
    ).expect("metric can be created");

    /// Total completed jobs, by outcome.
    pub static ref COMPLETED_TOTAL: CounterVec = CounterVec::new(
        Opts::new("completed_total", "Total jobs that reached a terminal state")
            .namespace("inferq"),
        &["outcome"]
    ).expect("metric can be created");

    /// Current number of jobs waiting in the queue.
    pub static ref QUEUE_DEPTH: Gauge = Gauge::with_opts(
        Opts::new("queue_depth", "Current number of jobs waiting in the queue")
            .namespace("inferq")
    ).expect("metric can be created");

    /// Workers currently alive.
    pub static ref WORKERS_ALIVE: Gauge = Gauge::with_opts(
        Opts::new("workers_alive", "Number of live workers in the pool")
            .namespace("inferq")
    ).expect("metric can be created");

    /// Worker faults (panics during execution).
    pub static ref WORKER_FAULTS_TOTAL: Counter = Counter::with_opts(
        Opts::new("worker_faults_total", "Total worker faults during execution")
            .namespace("inferq")
    ).expect("metric can be created");

    /// Queue wait time histogram.
    pub static ref QUEUE_WAIT_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new("queue_wait_seconds", "Time spent waiting in the queue")
            .namespace("inferq")
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5])
    ).expect("metric can be created");

    /// Execution time histogram.
    pub static ref EXECUTION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new("execution_seconds", "Executor call duration")
            .namespace("inferq")
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0])
    ).expect("metric can be created");
}

/// Register all metrics with the global registry.
/// Should be called once at startup.
pub fn register_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(SUBMISSIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(ACCEPTED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REJECTED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(COMPLETED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(QUEUE_DEPTH.clone()))?;
    REGISTRY.register(Box::new(WORKERS_ALIVE.clone()))?;
    REGISTRY.register(Box::new(WORKER_FAULTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(QUEUE_WAIT_SECONDS.clone()))?;
    REGISTRY.register(Box::new(EXECUTION_SECONDS.clone()))?;
    Ok(())
}

/// Encode all metrics to Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_else(|e| format!("# Error encoding metrics: {}", e))
}

/// Record a submission hitting the gate.
pub fn record_submission() {
    SUBMISSIONS_TOTAL.inc();
}

/// Record an accepted submission.
pub fn record_accepted() {
    ACCEPTED_TOTAL.inc();
}

/// Record a rejected submission.
pub fn record_rejected(reason: RejectReason) {
    REJECTED_TOTAL.with_label_values(&[reason.as_label()]).inc();
}

/// Record a completed job.
pub fn record_completed(outcome: Outcome, execution: Duration) {
    COMPLETED_TOTAL
        .with_label_values(&[outcome.as_label()])
        .inc();
    EXECUTION_SECONDS.observe(execution.as_secs_f64());
}

/// Record queue wait time for a dequeued job.
pub fn observe_queue_wait(wait: Duration) {
    QUEUE_WAIT_SECONDS.observe(wait.as_secs_f64());
}

/// Update the queue depth gauge.
pub fn set_queue_depth(depth: usize) {
    QUEUE_DEPTH.set(depth as f64);
}

/// Record a worker starting.
pub fn record_worker_started() {
    WORKERS_ALIVE.inc();
}

/// Record a worker exiting.
pub fn record_worker_stopped() {
    WORKERS_ALIVE.dec();
}

/// Record a worker fault.
pub fn record_worker_fault() {
    WORKER_FAULTS_TOTAL.inc();
}
