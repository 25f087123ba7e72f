//! Typed errors for the decision services.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Only input
//! validation ever reaches a caller; oracle failures are absorbed by the
//! fallback supervisor and surface as provenance instead.

use thiserror::Error;

/// Errors returned by the caller-facing operations.
#[derive(Debug, Error)]
pub enum DecisionError {
    /// Empty or blank text, rejected before any oracle call
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Configuration could not be loaded
    #[error("config error: {0}")]
    Config(String),
}

impl DecisionError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Failures of the external AI oracle.
///
/// Never surfaced to the end caller. Carried on degraded results as
/// `degraded_reason` so the fallback is observable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    /// The oracle did not answer within the configured timeout
    #[error("oracle timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// Connection failed or the oracle is offline
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response, rate limit, invalid request
    #[error("API error: {0}")]
    Api(String),

    /// Response could not be decoded or failed validation
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Result type alias for decision operations.
pub type Result<T> = std::result::Result<T, DecisionError>;

/// Result type alias for oracle calls.
pub type OracleResult<T> = std::result::Result<T, OracleError>;

/// Reject empty or whitespace-only text.
pub(crate) fn require_text<'a>(field: &str, text: &'a str) -> Result<&'a str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DecisionError::invalid_input(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}
