//! Request throttling shared by every task of a run.
//!
//! Two mechanisms stack here. A token bucket caps the aggregate request
//! rate across the whole pool, and a task cadence (short delay before each
//! task, longer batch-wide pause every N completed tasks) spreads bursts out.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Throttling knobs. Zero durations and `pause_every == 0` disable the
/// corresponding mechanism.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrottleConfig {
    /// Token bucket refill rate; `None` means unlimited.
    pub requests_per_second: Option<NonZeroU32>,
    /// Sleep before each task starts its work.
    pub task_delay: Duration,
    /// Take a batch pause after every this many completed tasks.
    pub pause_every: usize,
    /// Length of the batch pause.
    pub pause: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            requests_per_second: NonZeroU32::new(40),
            task_delay: Duration::from_millis(50),
            pause_every: 1000,
            pause: Duration::from_secs(10),
        }
    }
}

impl ThrottleConfig {
    /// No rate limit, no delays, no pauses.
    pub fn disabled() -> Self {
        Self {
            requests_per_second: None,
            task_delay: Duration::ZERO,
            pause_every: 0,
            pause: Duration::ZERO,
        }
    }
}

/// Shared throttle state.
///
/// The completion counter is the only mutable state touched by every task;
/// it is a plain atomic. The gate is held exclusively only while a batch
/// pause is in progress.
pub struct Throttle {
    config: ThrottleConfig,
    limiter: Option<DefaultDirectRateLimiter>,
    completed: AtomicUsize,
    gate: Arc<RwLock<()>>,
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle")
            .field("config", &self.config)
            .field("completed", &self.completed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Throttle {
    pub fn new(config: ThrottleConfig) -> Self {
        let limiter = config
            .requests_per_second
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));
        Self {
            config,
            limiter,
            completed: AtomicUsize::new(0),
            gate: Arc::new(RwLock::new(())),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(ThrottleConfig::disabled())
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Wait for a request token from the shared bucket.
    pub async fn acquire(&self) {
        if let Some(ref limiter) = self.limiter {
            limiter.until_ready().await;
        }
    }

    /// Wait out any batch pause in progress, then apply the per-task delay.
    pub async fn before_task(&self) {
        drop(self.gate.read().await);
        if !self.config.task_delay.is_zero() {
            tokio::time::sleep(self.config.task_delay).await;
        }
    }

    /// Count one finished task and return the new total.
    pub fn record_completion(&self) -> usize {
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether the completion that brought the count to `completed` owes a
    /// batch pause.
    pub fn pause_due(&self, completed: usize) -> bool {
        self.config.pause_every > 0
            && !self.config.pause.is_zero()
            && completed % self.config.pause_every == 0
    }

    /// Close the gate for the configured pause without blocking the caller.
    ///
    /// Tasks already past [`before_task`](Self::before_task) keep running;
    /// tasks arriving later wait until the pause is over. The returned
    /// handle finishes when the gate reopens.
    pub fn pause_batch(&self) -> JoinHandle<()> {
        let gate = self.gate.clone();
        let held = gate.clone().try_write_owned().ok();
        let pause = self.config.pause;
        log::info!(
            "Pausing {}s after {} completed tasks",
            pause.as_secs_f32(),
            self.completed()
        );
        tokio::spawn(async move {
            let _guard = match held {
                Some(guard) => guard,
                None => gate.write_owned().await,
            };
            tokio::time::sleep(pause).await;
        })
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Zero the completion counter at the start of a new batch.
    pub fn reset_progress(&self) {
        self.completed.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    fn cadence(pause_every: usize, pause: Duration, task_delay: Duration) -> ThrottleConfig {
        ThrottleConfig {
            requests_per_second: None,
            task_delay,
            pause_every,
            pause,
        }
    }

    #[test]
    fn test_pause_due_every_nth_completion() {
        let throttle = Throttle::new(cadence(3, Duration::from_secs(1), Duration::ZERO));
        let due: Vec<bool> = (0..7)
            .map(|_| throttle.record_completion())
            .map(|n| throttle.pause_due(n))
            .collect();
        assert_eq!(due, vec![false, false, true, false, false, true, false]);
        assert_eq!(throttle.completed(), 7);
    }

    #[test]
    fn test_disabled_never_pauses() {
        let throttle = Throttle::unlimited();
        assert!(!throttle.pause_due(1000));
        assert!(!throttle.pause_due(0));
    }

    #[test]
    fn test_reset_progress() {
        let throttle = Throttle::unlimited();
        throttle.record_completion();
        throttle.record_completion();
        throttle.reset_progress();
        assert_eq!(throttle.completed(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_before_task_applies_delay() {
        let throttle = Throttle::new(cadence(0, Duration::ZERO, Duration::from_millis(250)));
        let start = Instant::now();
        throttle.before_task().await;
        assert!(start.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_pause_holds_new_tasks() {
        let throttle = Throttle::new(cadence(1, Duration::from_secs(10), Duration::ZERO));

        let pausing = throttle.pause_batch();

        let start = Instant::now();
        throttle.before_task().await;
        assert!(start.elapsed() >= Duration::from_secs(10));
        pausing.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_batch_returns_immediately() {
        let throttle = Throttle::new(cadence(1, Duration::from_secs(300), Duration::ZERO));

        let start = Instant::now();
        let pausing = throttle.pause_batch();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(!pausing.is_finished());

        pausing.await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_token_bucket_bounds_request_rate() {
        let throttle = Throttle::new(ThrottleConfig {
            requests_per_second: NonZeroU32::new(10),
            ..ThrottleConfig::disabled()
        });

        // A full bucket of 10, then one token per 100ms
        let start = std::time::Instant::now();
        for _ in 0..15 {
            throttle.acquire().await;
        }
        assert!(start.elapsed() >= Duration::from_millis(450));
    }

    #[tokio::test]
    async fn test_unlimited_acquire_returns_immediately() {
        let throttle = Throttle::unlimited();
        for _ in 0..100 {
            throttle.acquire().await;
        }
    }
}
