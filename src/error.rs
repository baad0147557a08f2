//! Error handling

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

// ============================================================================
// FEED ERRORS
// ============================================================================

/// Failure to obtain a batch from the upstream feed.
///
/// Always recovered locally: the poller counts it and retries on the next tick.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("fetch timed out after {0} ms")]
    Timeout(u64),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("malformed body: {0}")]
    MalformedBody(String),
}

/// A single raw record that cannot become a `FlowRecord`.
///
/// The record is dropped; the rest of the batch is kept.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}

/// Invalid pagination window, rejected before any work is done.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuerySpecError {
    #[error("offset must not be negative (got {0})")]
    NegativeOffset(i64),

    #[error("limit must be at least 1 (got {0})")]
    LimitTooSmall(i64),

    #[error("limit {requested} exceeds maximum page size {max}")]
    LimitTooLarge { requested: i64, max: usize },
}

/// Startup configuration error. Fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: cannot parse `{value}`")]
    Invalid { key: &'static str, value: String },

    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },

    #[error("moderate threshold ({moderate}) must be below high threshold ({high})")]
    RiskThresholds { moderate: u64, high: u64 },

    #[error("max backoff ({backoff_ms} ms) must not be below the poll interval ({interval_ms} ms)")]
    Backoff { backoff_ms: u64, interval_ms: u64 },

    #[error("default page size ({default}) exceeds maximum page size ({max})")]
    PageSize { default: usize, max: usize },
}

// ============================================================================
// HTTP ERRORS
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    // Validation errors
    InvalidQuery(QuerySpecError),
    ValidationError(String),

    // Resource errors
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidQuery(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<QuerySpecError> for AppError {
    fn from(err: QuerySpecError) -> Self {
        AppError::InvalidQuery(err)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}
