//! # inferq
//!
//! Admission-controlled worker pool for local LLM inference serving.
//!
//! A fixed-size worker pool fronted by a bounded admission queue, built for
//! a memory- and CPU-constrained single host. Under request bursts the
//! engine decides deterministically and cheaply whether to accept or reject
//! new work, so latency and memory stay bounded when demand exceeds
//! capacity. Rejected callers get an immediate, typed answer; nothing ever
//! waits at the front door.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Submission paths (N)                   │
//! └───────────────────────────┬─────────────────────────────┘
//!                             │ submit() — never suspends
//!                    ┌────────▼────────┐
//!                    │  AdmissionGate  │──► Rejected(QueueFull)
//!                    └────────┬────────┘
//!                             │
//!                    ┌────────▼────────┐
//!                    │    JobQueue     │ ← bounded FIFO
//!                    └────────┬────────┘
//!                             │ dequeue() — only suspension point
//!              ┌──────────────┼──────────────┐
//!       ┌──────▼─────┐ ┌──────▼─────┐ ┌──────▼─────┐
//!       │  Worker 0  │ │  Worker 1  │ │  Worker W  │
//!       └──────┬─────┘ └──────┬─────┘ └──────┬─────┘
//!              │              │              │
//!              └──────────────▼──────────────┘
//!                    ┌─────────────────┐
//!                    │    Executor     │ ← external model runtime
//!                    └─────────────────┘
//! ```
//!
//! Each accepted job carries a single-use response slot; the worker that
//! dequeues it delivers exactly one of a result or a typed execution
//! failure. All coordination flows through the queue and those slots —
//! there is no other shared mutable state between producers and consumers.
//!
//! Queue capacity is not a tuned constant: [`derive_capacity`] re-derives it
//! from worker count and measured per-job latency so a full queue drains
//! within the configured wait target.
//!
//! # Example
//!
//! ```no_run
//! use inferq::{Engine, EngineConfig, ExecuteError, Executor};
//!
//! struct MyModel;
//!
//! impl Executor for MyModel {
//!     type Payload = String;
//!     type Output = String;
//!
//!     async fn execute(&self, prompt: String) -> Result<String, ExecuteError> {
//!         // Hand off to the real inference runtime here.
//!         Ok(format!("echo: {prompt}"))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     inferq::init_metrics();
//!
//!     let engine = Engine::start(EngineConfig::default(), MyModel)?;
//!
//!     match engine.submit("hello".to_string()) {
//!         Ok(ticket) => println!("{}", ticket.wait().await?),
//!         Err(rejected) => println!("back off: {rejected}"),
//!     }
//!
//!     engine.shutdown().await;
//!     Ok(())
//! }
//! ```

use tracing::warn;

pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod gate;
pub mod job;
pub mod metrics;
pub mod pool;
pub mod queue;

pub use config::{derive_capacity, EngineConfig};
pub use engine::Engine;
pub use error::{EngineError, ExecuteError, Outcome, RejectReason, SubmitError};
pub use executor::Executor;
pub use gate::AdmissionGate;
pub use job::{Job, JobTicket};
pub use metrics::{encode_metrics, register_metrics, EngineMetrics, MetricsSnapshot};
pub use queue::JobQueue;

/// Initialize the Prometheus metrics registry.
/// Should be called once before starting the engine.
pub fn init_metrics() {
    if let Err(e) = metrics::register_metrics() {
        warn!("Failed to register Prometheus metrics: {}", e);
    }
}
