//! Traffic Feed Engine
//!
//! Pulls network-flow records from an upstream feed, classifies them and
//! serves a filtered, paginated view of the latest snapshot.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TRAFFIC FEED                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────┐   ┌───────────────────┐   │
//! │  │  Source   │──▶│ Assign +     │──▶│  Feed Store       │   │
//! │  │  Poller   │   │ Classify     │   │  (watch<Arc<..>>) │   │
//! │  └───────────┘   └──────────────┘   └─────────┬─────────┘   │
//! │                                               ▼             │
//! │                       ┌───────────────────────────────┐     │
//! │                       │  Query Engine + HTTP API      │     │
//! │                       │  (Axum)                       │     │
//! │                       └───────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod feed;

pub use error::{AppError, AppResult};
