//! Errors raised by the upstream client and the fetch orchestrator.

use skycache_core::AppError;
use thiserror::Error;

use crate::types::ResourceKind;

/// Any failure talking to the upstream provider.
///
/// Transport errors, non-success statuses and undecodable bodies all collapse into
/// this single type; only the message differs.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct UpstreamError {
    message: String,
}

impl UpstreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        // The request URL carries the API key
        Self::new(e.without_url().to_string())
    }
}

impl From<serde_json::Error> for UpstreamError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("Invalid upstream response: {}", e))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("{0}")]
    Upstream(#[from] UpstreamError),

    #[error("Expected {expected} payload, got {actual}")]
    UnexpectedPayload {
        expected: ResourceKind,
        actual: ResourceKind,
    },
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        AppError::Upstream(e.to_string())
    }
}
