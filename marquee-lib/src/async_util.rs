//! Drive an ingestion run while consuming its progress events.
//!
//! The fetch pipeline reports progress over an mpsc channel. Frontends need
//! to render those events while the run is still going and must not lose
//! the tail of events emitted just before the run finishes.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

/// How long to keep draining after the task finished. Guards against a
/// sender clone that was leaked into a detached task.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Abstraction over bounded and unbounded mpsc receivers.
#[allow(async_fn_in_trait)]
pub trait EventReceiver<E> {
    /// Receive the next event, returning `None` when the channel is closed.
    async fn recv(&mut self) -> Option<E>;
}

impl<E> EventReceiver<E> for mpsc::Receiver<E> {
    async fn recv(&mut self) -> Option<E> {
        mpsc::Receiver::recv(self).await
    }
}

impl<E> EventReceiver<E> for mpsc::UnboundedReceiver<E> {
    async fn recv(&mut self) -> Option<E> {
        mpsc::UnboundedReceiver::recv(self).await
    }
}

/// Run `task` to completion, calling `on_event` for every event received on
/// `event_rx`, and return the task's output once the channel is drained.
pub async fn run_with_events<F, E, R, Rx>(
    task: F,
    mut event_rx: Rx,
    mut on_event: impl FnMut(E),
) -> R
where
    F: Future<Output = R>,
    Rx: EventReceiver<E> + Unpin,
{
    tokio::pin!(task);
    let mut seen: u64 = 0;

    let output = loop {
        tokio::select! {
            r = &mut task => break Some(r),
            event = event_rx.recv() => match event {
                Some(e) => {
                    seen += 1;
                    on_event(e);
                }
                None => break None,
            },
        }
    };

    let Some(output) = output else {
        log::debug!("run_with_events: channel closed after {} events, awaiting task", seen);
        return task.await;
    };

    let deadline = Instant::now() + DRAIN_TIMEOUT;
    loop {
        match tokio::time::timeout_at(deadline, event_rx.recv()).await {
            Ok(Some(e)) => {
                seen += 1;
                on_event(e);
            }
            Ok(None) => break,
            Err(_) => {
                log::warn!(
                    "run_with_events: drain timed out after {}s, senders likely leaked",
                    DRAIN_TIMEOUT.as_secs()
                );
                break;
            }
        }
    }
    log::debug!("run_with_events: finished after {} events", seen);
    output
}
