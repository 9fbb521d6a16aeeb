//! Async plumbing shared by the marquee crates: a bounded worker pool,
//! request throttling, event-channel driving and the settings file.

pub mod async_util;
pub mod error;
pub mod settings;
pub mod throttle;
pub mod worker_pool;

pub use async_util::{EventReceiver, run_with_events};
pub use error::PoolError;
pub use settings::{IngestSettings, QuerySettings, Settings};
pub use throttle::{Throttle, ThrottleConfig};
pub use worker_pool::WorkerPool;
