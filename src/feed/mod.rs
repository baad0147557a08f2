//! Feed Module
//!
//! Live traffic feed pipeline: poll the upstream flow list, number it,
//! classify it and serve filtered pages of the latest snapshot.
//!
//! ## Structure
//! - `types`: RawFlow, FlowRecord, IdentifiedFlow, FeedSnapshot
//! - `source`: upstream client (`FlowSource`, `HttpFlowSource`)
//! - `poller`: timeout, failure counting, backoff
//! - `identity`: batch-relative sequence ids
//! - `rules`: protocol categories, risk tiers, thresholds
//! - `classifier`: classification and record validation
//! - `store`: atomically swapped snapshot
//! - `query`: filter / malicious-only / pagination, snapshot summary
//! - `status`: poll health record
//! - `engine`: background tasks wiring it all together
//!
//! ## Usage
//! ```ignore
//! let source = HttpFlowSource::new(HttpSourceConfig { url, timeout })?;
//! let engine = FeedEngine::start(source, EngineSettings::default());
//! let page = engine.query(&QuerySpec::default().with_filter("dns"))?;
//! ```

pub mod types;
pub mod source;
pub mod poller;
pub mod identity;
pub mod rules;
pub mod classifier;
pub mod store;
pub mod query;
pub mod status;
pub mod engine;

pub use types::{BlacklistValue, FeedSnapshot, FlowRecord, IdentifiedFlow, PortToken, RawFlow, Verdict};
pub use source::{FlowSource, HttpFlowSource, HttpSourceConfig};
pub use poller::{PollSchedule, SourcePoller};
pub use rules::{ProtocolCategory, RiskThresholds, RiskTier};
pub use classifier::{Classification, Classifier};
pub use store::{FeedReader, FeedStore};
pub use query::{QueryEngine, QueryPage, QuerySpec, SnapshotSummary};
pub use status::FeedStatus;
pub use engine::{EngineSettings, FeedEngine};
