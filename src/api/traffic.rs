//! Traffic handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::{AppError, AppResult};
use crate::feed::query::summarize;
use crate::feed::{IdentifiedFlow, QueryPage, QuerySpec, SnapshotSummary};

/// Query parameters; omitted fields fall back to the configured defaults
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficParams {
    pub filter_text: Option<String>,
    pub malicious_only: Option<bool>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl TrafficParams {
    fn into_spec(self, default_limit: usize) -> QuerySpec {
        QuerySpec {
            filter_text: self.filter_text.unwrap_or_default(),
            malicious_only: self.malicious_only.unwrap_or(false),
            offset: self.offset.unwrap_or(0),
            limit: self.limit.unwrap_or(default_limit as i64),
        }
    }
}

/// Page through the current snapshot
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<TrafficParams>, QueryRejection>,
) -> AppResult<Json<QueryPage>> {
    let Query(params) = params?;
    run(&state, params)
}

/// Same as `list`, with the query spec as a JSON body
pub async fn query(
    State(state): State<AppState>,
    params: Result<Json<TrafficParams>, JsonRejection>,
) -> AppResult<Json<QueryPage>> {
    let Json(params) = params?;
    run(&state, params)
}

/// Single flow of the current snapshot
pub async fn get(
    State(state): State<AppState>,
    Path(sequence_id): Path<u64>,
) -> AppResult<Json<IdentifiedFlow>> {
    let snapshot = state.reader.current();
    let flow = snapshot
        .get(sequence_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Flow {} not in current snapshot", sequence_id)))?;

    Ok(Json(flow))
}

/// Aggregate counts of the current snapshot
pub async fn summary(State(state): State<AppState>) -> Json<SnapshotSummary> {
    Json(summarize(&state.reader.current()))
}

fn run(state: &AppState, params: TrafficParams) -> AppResult<Json<QueryPage>> {
    let spec = params.into_spec(state.default_page_size);
    let page = state.queries.run(&state.reader.current(), &spec)?;
    Ok(Json(page))
}
