//! Bounded job queue.
//!
//! The queue is the sole shared mutable structure between producers and
//! workers. Enqueue is non-blocking by construction: under overload it fails
//! immediately instead of suspending the submitter, which is what keeps
//! admission latency bounded when demand exceeds capacity.

mod bounded;

pub use bounded::JobQueue;
