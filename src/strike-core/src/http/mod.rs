pub mod get;
pub mod post;
pub mod retryable;

use backoff::exponential::ExponentialBackoff;
use backoff::{ExponentialBackoffBuilder, SystemClock};
use std::time::Duration;

/// Back-off used for idempotent fetches (action descriptors, `actions.json`).
pub fn default_retry_policy() -> ExponentialBackoff<SystemClock> {
    ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(250))
        .with_max_interval(Duration::from_secs(2))
        .with_max_elapsed_time(Some(Duration::from_secs(10)))
        .build()
}
