// ================================================================
// File: guardian-common/src/error.rs
// ================================================================

use std::time::Duration;
use thiserror::Error;

/// Failures of the outbound model call that happen after credentials were
/// found. Missing credentials are an `Error::Configuration`, never one of these.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("network failure: {0}")]
    Network(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Ledger error: {0}")]
    Ledger(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Missing credentials or a failed round trip. Optional model calls may
    /// degrade on these and nothing else.
    pub fn is_gateway_failure(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::Transport(_))
    }
}
