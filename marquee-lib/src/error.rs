use thiserror::Error;

/// Errors raised by the worker pool itself (never by the work it runs).
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool was configured with no workers and cannot accept work
    #[error("Worker pool has no workers")]
    NoWorkers,

    /// A worker task panicked or was cancelled
    #[error("Worker task failed: {0}")]
    WorkerFailed(String),
}
