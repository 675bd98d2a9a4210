//! Per-asset backoff after a failed price fetch.

use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};
use std::time::Duration;
use tokio::time::Instant;

pub const MIN_DELAY: Duration = Duration::from_secs(1);
pub const MAX_DELAY: Duration = Duration::from_secs(60);

/// Ticks arriving before `retry_at` skip the provider entirely. A success
/// resets the delay sequence.
pub struct FetchBackoff {
    builder: ExponentialBuilder,
    delays: Option<ExponentialBackoff>,
    retry_at: Option<Instant>,
    failures: u32,
}

impl FetchBackoff {
    pub fn new(min_delay: Duration, max_delay: Duration, jitter: bool) -> Self {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(min_delay)
            .with_max_delay(max_delay)
            .without_max_times();
        if jitter {
            builder = builder.with_jitter();
        }
        Self {
            builder,
            delays: None,
            retry_at: None,
            failures: 0,
        }
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn retry_at(&self) -> Option<Instant> {
        self.retry_at
    }

    pub fn is_waiting(&self, now: Instant) -> bool {
        self.retry_at.is_some_and(|at| now < at)
    }

    /// Arm the next delay and return it.
    pub fn record_failure(&mut self, now: Instant) -> Duration {
        let builder = &self.builder;
        let delay = self
            .delays
            .get_or_insert_with(|| builder.clone().build())
            .next()
            .unwrap_or(MAX_DELAY);
        self.failures += 1;
        self.retry_at = Some(now + delay);
        delay
    }

    pub fn reset(&mut self) {
        self.delays = None;
        self.retry_at = None;
        self.failures = 0;
    }
}

impl Default for FetchBackoff {
    fn default() -> Self {
        Self::new(MIN_DELAY, MAX_DELAY, true)
    }
}
