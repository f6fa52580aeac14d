//! Metrics for the inference engine.
//!
//! Two layers: [`EngineMetrics`] keeps in-process atomic counters (the
//! source of truth for accounting invariants), and the [`prometheus`]
//! module mirrors them into a scrape-compatible registry.

mod counters;
pub mod prometheus;

pub use counters::{EngineMetrics, MetricsSnapshot};
pub use prometheus::{encode_metrics, register_metrics};
