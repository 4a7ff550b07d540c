//! Error taxonomy surfaced to HTTP callers.
//!
//! Lower layers (upstream client, cache, fetcher) keep their own error types and
//! convert into [`AppError`] at the handler boundary. This is the only place where an
//! error kind is tied to a response status.

use thiserror::Error;

/// Handler-facing error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    /// A required request parameter was missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The upstream provider failed (transport, status, or decoding).
    #[error("{0}")]
    Upstream(String),

    /// A forecast position outside the bounds of the sequence.
    #[error("invalid item_id")]
    InvalidIndex(usize),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// HTTP status code for this error kind.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::InvalidIndex(_) => 404,
            AppError::Upstream(_) => 502,
        }
    }
}
