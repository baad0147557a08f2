//! Feed health status published by the ingest task.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatus {
    pub last_poll_succeeded: bool,
    pub consecutive_failures: u32,
    pub last_snapshot_size: usize,
    /// Generation of the snapshot currently served
    pub generation: u64,
    pub polls: u64,
    pub last_poll_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    /// Records dropped from the last successful batch
    pub dropped_records: usize,
}

impl FeedStatus {
    /// Degraded-service policy belongs to the caller; pass its threshold.
    /// A threshold of 0 never reports degraded.
    pub fn is_degraded(&self, after_failures: u32) -> bool {
        after_failures > 0 && self.consecutive_failures >= after_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_threshold() {
        let status = FeedStatus {
            consecutive_failures: 3,
            ..Default::default()
        };
        assert!(status.is_degraded(1));
        assert!(status.is_degraded(3));
        assert!(!status.is_degraded(5));
        assert!(!status.is_degraded(0));
    }
}
