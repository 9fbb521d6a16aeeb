//! Worker pool for concurrent processing with backpressure.
//!
//! Spawns N persistent tokio tasks that pull work items from a bounded
//! async-channel. Results are sent to an unbounded channel for consumption
//! by the caller, either one at a time or all at once through
//! [`WorkerPool::join`].
//!
//! Uses `async-channel` for work distribution. Its `Receiver` is `Clone`,
//! so each worker gets its own handle with no `Mutex` needed.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::error::PoolError;

/// Default timeout per work item. If a process_fn hangs beyond this, the
/// worker drops the future and moves on. Callers whose items can legitimately
/// run longer pass their own bound through [`WorkerPool::start_with_timeout`].
pub const SAFETY_TIMEOUT: Duration = Duration::from_secs(120);

/// A pool of worker tasks that process items concurrently.
///
/// At most `n` items are in progress at any moment: each worker handles
/// one item at a time and there are exactly `n` workers.
///
/// # Example
///
/// ```ignore
/// let pool = WorkerPool::start(4, items, |item| async move {
///     process(item).await
/// })?;
///
/// for result in pool.join().await? {
///     handle(result);
/// }
/// ```
pub struct WorkerPool<R: Send + 'static> {
    result_rx: mpsc::UnboundedReceiver<R>,
    handles: Vec<JoinHandle<()>>,
    submitted: usize,
}

impl<R: Send + 'static> WorkerPool<R> {
    /// Spawn N workers, submit all items, and return a pool for receiving results.
    ///
    /// Uses [`SAFETY_TIMEOUT`] per item.
    pub fn start<W, F, Fut>(n: usize, items: Vec<W>, process_fn: F) -> Result<Self, PoolError>
    where
        W: Send + 'static,
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        Self::start_with_timeout(n, items, SAFETY_TIMEOUT, process_fn)
    }

    /// Like [`start`](Self::start) with an explicit per-item timeout.
    ///
    /// An item that exceeds `item_timeout` is dropped and produces no
    /// result; the worker moves on to the next item.
    ///
    /// Submission happens in a background task so the caller can start
    /// receiving results immediately without deadlock.
    pub fn start_with_timeout<W, F, Fut>(
        n: usize,
        items: Vec<W>,
        item_timeout: Duration,
        process_fn: F,
    ) -> Result<Self, PoolError>
    where
        W: Send + 'static,
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        if n == 0 {
            return Err(PoolError::NoWorkers);
        }

        let submitted = items.len();
        let (work_tx, work_rx) = async_channel::bounded::<W>(n);
        let (result_tx, result_rx) = mpsc::unbounded_channel::<R>();
        let process_fn = Arc::new(process_fn);

        let handles: Vec<JoinHandle<()>> = (0..n)
            .map(|_| {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let process_fn = process_fn.clone();
                tokio::spawn(async move {
                    while let Ok(item) = work_rx.recv().await {
                        match tokio::time::timeout(item_timeout, process_fn(item)).await {
                            Ok(r) => {
                                if result_tx.send(r).is_err() {
                                    break; // Receiver dropped
                                }
                            }
                            Err(_) => {
                                log::warn!(
                                    "Worker pool: item timed out after {}s, skipping",
                                    item_timeout.as_secs_f32()
                                );
                            }
                        }
                    }
                })
            })
            .collect();

        // Channel closes once every worker has dropped its sender
        drop(result_tx);

        tokio::spawn(async move {
            for item in items {
                if work_tx.send(item).await.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            result_rx,
            handles,
            submitted,
        })
    }

    /// Number of items handed to the pool.
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Receive the next result. Returns `None` when all items have been
    /// processed and all workers have shut down.
    pub async fn recv(&mut self) -> Option<R> {
        self.result_rx.recv().await
    }

    /// Wait for every item to finish and collect the results.
    ///
    /// Results arrive in completion order. Items that timed out are absent.
    /// A worker that panicked makes the whole batch fail with
    /// [`PoolError::WorkerFailed`].
    pub async fn join(mut self) -> Result<Vec<R>, PoolError> {
        let mut results = Vec::with_capacity(self.submitted);
        while let Some(r) = self.result_rx.recv().await {
            results.push(r);
        }

        for handle in self.handles.drain(..) {
            handle
                .await
                .map_err(|e| PoolError::WorkerFailed(e.to_string()))?;
        }

        if results.len() < self.submitted {
            log::debug!(
                "Worker pool: {} of {} items produced no result",
                self.submitted - results.len(),
                self.submitted
            );
        }
        Ok(results)
    }
}

#[cfg(test)]
#[path = "tests/worker_pool_tests.rs"]
mod tests;
