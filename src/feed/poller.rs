//! Source Poller
//!
//! Wraps a `FlowSource` with a bounded timeout, counts consecutive failures
//! and computes the delay before the next poll.

use std::time::Duration;

use super::source::FlowSource;
use super::types::RawFlow;
use crate::error::SourceError;

/// Poll timing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    /// Delay between polls while the source is healthy
    pub interval: Duration,
    /// Upper bound for one fetch
    pub fetch_timeout: Duration,
    /// Cap for the failure backoff. Equal to `interval` disables backoff.
    pub max_backoff: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        use crate::constants;

        Self {
            interval: Duration::from_millis(constants::DEFAULT_POLL_INTERVAL_MS),
            fetch_timeout: Duration::from_millis(constants::DEFAULT_FETCH_TIMEOUT_MS),
            max_backoff: Duration::from_millis(constants::DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

pub struct SourcePoller<S> {
    source: S,
    schedule: PollSchedule,
    consecutive_failures: u32,
}

impl<S: FlowSource> SourcePoller<S> {
    pub fn new(source: S, schedule: PollSchedule) -> Self {
        Self {
            source,
            schedule,
            consecutive_failures: 0,
        }
    }

    /// One fetch. A success resets the failure counter, a failure bumps it by one.
    pub async fn poll(&mut self) -> Result<Vec<RawFlow>, SourceError> {
        let timeout = self.schedule.fetch_timeout;
        let result = match tokio::time::timeout(timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(timeout.as_millis() as u64)),
        };

        match &result {
            Ok(batch) => {
                tracing::debug!(records = batch.len(), "poll succeeded");
                self.consecutive_failures = 0;
            }
            Err(e) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                tracing::warn!(
                    error = %e,
                    consecutive_failures = self.consecutive_failures,
                    "poll failed, keeping previous snapshot"
                );
            }
        }

        result
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// `interval` while healthy, then `interval * 2^(k-1)` after `k`
    /// failures, capped at `max_backoff`.
    pub fn next_delay(&self) -> Duration {
        let interval = self.schedule.interval;
        if self.consecutive_failures <= 1 {
            return interval;
        }
        let exponent = (self.consecutive_failures - 1).min(16);
        interval
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.schedule.max_backoff)
            .min(self.schedule.max_backoff.max(interval))
    }
}

// ============================================================================
// TESTS
// ============================================================================
