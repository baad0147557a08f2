//! Upstream Feed Client
//!
//! HTTP client for the traffic feed endpoint.

use std::future::Future;
use std::time::Duration;

use super::types::RawFlow;
use crate::error::SourceError;

/// Anything that can hand over the current raw flow list.
pub trait FlowSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Vec<RawFlow>, SourceError>> + Send;
}

/// Feed endpoint configuration
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    pub url: String,
    pub timeout: Duration,
}

/// GETs a JSON array of flows
pub struct HttpFlowSource {
    config: HttpSourceConfig,
    http_client: reqwest::Client,
}

impl HttpFlowSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        Ok(Self { config, http_client })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }
}

impl FlowSource for HttpFlowSource {
    async fn fetch(&self) -> Result<Vec<RawFlow>, SourceError> {
        let response = self.http_client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let body = response.bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        serde_json::from_slice(&body)
            .map_err(|e| SourceError::MalformedBody(e.to_string()))
    }
}

impl HttpFlowSource {
    fn transport_error(&self, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout(self.config.timeout.as_millis() as u64)
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}
