//! Configuration for the inference engine.
//!
//! Read once at startup; the queue and worker pool are never resized at
//! runtime. Capacity is not a tuned constant: [`derive_capacity`] re-derives
//! it from worker count and measured latency so operators can recompute it
//! whenever either changes.

use std::time::Duration;

use crate::error::EngineError;

/// Configuration for the engine: worker pool, queue, and timing policy.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of long-lived workers. Must be >= 1.
    pub worker_count: usize,

    /// Fixed queue capacity. 0 is valid and means "accept no more than
    /// in-flight capacity" (useful for deterministic overload testing).
    pub queue_capacity: usize,

    /// Design-time wait target used to derive capacity. Not enforced as a
    /// runtime deadline; callers apply their own timeouts.
    pub target_max_wait: Duration,

    /// Upper bound on a single executor call. `None` disables the bound,
    /// which leaves a hung executor call holding a worker forever.
    pub execution_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            queue_capacity: 64,
            target_max_wait: Duration::from_secs(30),
            execution_timeout: Some(Duration::from_secs(300)),
        }
    }
}

impl EngineConfig {
    /// Config optimized for low latency (single user, shallow queue).
    pub fn low_latency() -> Self {
        Self {
            worker_count: 1,
            queue_capacity: 8,
            target_max_wait: Duration::from_secs(1),
            execution_timeout: Some(Duration::from_secs(60)),
        }
    }

    /// Config optimized for high throughput (many concurrent submitters).
    pub fn high_throughput() -> Self {
        Self {
            worker_count: 8,
            queue_capacity: 256,
            target_max_wait: Duration::from_secs(60),
            execution_timeout: Some(Duration::from_secs(600)),
        }
    }

    /// Build a config whose queue capacity is derived from the sizing policy
    /// instead of picked by hand. See [`derive_capacity`].
    pub fn sized_for(
        worker_count: usize,
        per_job_time: Duration,
        target_max_wait: Duration,
    ) -> Self {
        Self {
            worker_count,
            queue_capacity: derive_capacity(worker_count, per_job_time, target_max_wait),
            target_max_wait,
            ..Self::default()
        }
    }

    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("INFERQ_WORKERS") {
            if let Ok(n) = val.parse() {
                config.worker_count = n;
            }
        }

        if let Ok(val) = std::env::var("INFERQ_QUEUE_CAPACITY") {
            if let Ok(n) = val.parse() {
                config.queue_capacity = n;
            }
        }

        if let Ok(val) = std::env::var("INFERQ_TARGET_MAX_WAIT_MS") {
            if let Ok(n) = val.parse() {
                config.target_max_wait = Duration::from_millis(n);
            }
        }

        if let Ok(val) = std::env::var("INFERQ_EXECUTION_TIMEOUT_SECS") {
            if let Ok(n) = val.parse::<u64>() {
                config.execution_timeout = if n == 0 {
                    None
                } else {
                    Some(Duration::from_secs(n))
                };
            }
        }

        config
    }

    /// Validate configuration values. Called by the engine at startup.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.worker_count == 0 {
            return Err(EngineError::InvalidConfig(
                "worker_count must be >= 1".into(),
            ));
        }
        if let Some(timeout) = self.execution_timeout {
            if timeout.is_zero() {
                return Err(EngineError::InvalidConfig(
                    "execution_timeout must be > 0 when set".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Derive queue capacity from worker count and steady-state latency.
///
/// ```text
/// capacity = worker_count * floor(target_max_wait / (per_job_time * worker_count))
/// ```
///
/// This bounds the wait experienced by a job admitted to an already-full
/// queue to approximately `target_max_wait`, given the measured per-job
/// processing time. Degenerate inputs (no workers, zero per-job time, or a
/// per-job slice longer than the wait target) derive a capacity of 0.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use inferq::derive_capacity;
///
/// let capacity = derive_capacity(4, Duration::from_millis(5), Duration::from_millis(100));
/// assert_eq!(capacity, 20);
/// ```
pub fn derive_capacity(
    worker_count: usize,
    per_job_time: Duration,
    target_max_wait: Duration,
) -> usize {
    if worker_count == 0 || per_job_time.is_zero() {
        return 0;
    }
    let workers = u32::try_from(worker_count).unwrap_or(u32::MAX);
    let drain_round = per_job_time.saturating_mul(workers);
    let rounds = (target_max_wait.as_nanos() / drain_round.as_nanos()) as usize;
    worker_count * rounds
}
