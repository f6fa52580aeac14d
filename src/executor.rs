//! The outbound seam to the model runtime.
//!
//! The engine never runs inference itself; each worker hands the job payload
//! to an [`Executor`] and delivers whatever comes back. Tokenization, numeric
//! inference, and backend transport all live behind this trait.

use std::future::Future;

use crate::error::ExecuteError;

/// External model-execution capability invoked by each worker.
///
/// Implementations must be shareable across workers (`Send + Sync`); the
/// engine holds one instance behind an `Arc`. The returned future runs
/// inside a worker-owned task, so a panicking or hanging implementation is
/// contained to the job that triggered it.
pub trait Executor: Send + Sync + 'static {
    /// Opaque job payload (e.g. a prompt plus generation parameters).
    type Payload: Send + 'static;

    /// Successful execution result.
    type Output: Send + 'static;

    /// Execute one job synchronously from the worker's point of view.
    ///
    /// Errors returned here are delivered verbatim to the job's response
    /// slot; they are never retried by the engine.
    fn execute(
        &self,
        payload: Self::Payload,
    ) -> impl Future<Output = Result<Self::Output, ExecuteError>> + Send;
}
