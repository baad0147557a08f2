//! HTTP API
//!
//! Outbound query and status interfaces for the dashboard.

pub mod health;
pub mod status;
pub mod traffic;

use axum::{routing::{get, post}, Router};
use tokio::sync::watch;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::feed::{FeedEngine, FeedReader, FeedStatus, QueryEngine};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub reader: FeedReader,
    pub status: watch::Receiver<FeedStatus>,
    pub queries: QueryEngine,
    pub default_page_size: usize,
    pub degraded_after: u32,
}

impl AppState {
    pub fn new(engine: &FeedEngine, queries: QueryEngine, default_page_size: usize, degraded_after: u32) -> Self {
        Self {
            reader: engine.reader(),
            status: engine.status_watch(),
            queries,
            default_page_size,
            degraded_after,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::check))
        .route("/api/v1/status", get(status::get))
        .route("/api/v1/traffic", get(traffic::list))
        .route("/api/v1/traffic/query", post(traffic::query))
        .route("/api/v1/traffic/summary", get(traffic::summary))
        .route("/api/v1/traffic/:sequence_id", get(traffic::get))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
