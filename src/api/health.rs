//! Health check handler

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppState;
use crate::constants::APP_VERSION;

/// Liveness plus the freshness of the served snapshot
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    generation: u64,
    last_success_at: Option<DateTime<Utc>>,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let last_success_at = state.status.borrow().last_success_at;

    Json(HealthResponse {
        status: "healthy",
        version: APP_VERSION,
        timestamp: Utc::now().timestamp(),
        generation: state.reader.current().generation,
        last_success_at,
    })
}
