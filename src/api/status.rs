//! Feed status handler

use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::feed::FeedStatus;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: FeedStatus,
    /// `consecutiveFailures` reached the configured threshold
    pub degraded: bool,
}

pub async fn get(State(state): State<AppState>) -> Json<StatusResponse> {
    let status = state.status.borrow().clone();
    let degraded = status.is_degraded(state.degraded_after);

    Json(StatusResponse { status, degraded })
}
