//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.

/// Default upstream traffic feed endpoint
pub const DEFAULT_SOURCE_URL: &str = "http://127.0.0.1:8000/traffic";

/// Default poll period (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Default upper bound for a single fetch (milliseconds)
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;

/// Packets above this count = High risk
pub const DEFAULT_RISK_HIGH_PACKETS: u64 = 1_000;

/// Packets above this count = Moderate risk
pub const DEFAULT_RISK_MODERATE_PACKETS: u64 = 500;

/// Consecutive failures before the status endpoint reports `degraded`
pub const DEFAULT_DEGRADED_AFTER: u32 = 1;

/// Page size when a query omits `limit`
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest `limit` a query may request
pub const DEFAULT_MAX_PAGE_SIZE: usize = 500;

/// Server port
pub const DEFAULT_PORT: u16 = 8080;

/// Server bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Reason recorded when upstream flags a flow without explaining why
pub const UNSPECIFIED_REASON: &str = "unspecified";

/// Annotation recorded when upstream sends `blacklisted: true`
pub const BLACKLISTED_MARKER: &str = "blacklisted";

/// Capacity of the poller -> ingest channel
pub const POLL_CHANNEL_CAPACITY: usize = 4;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
