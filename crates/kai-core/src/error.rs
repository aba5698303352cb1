//! Errors raised at the model-invocation boundary.

use thiserror::Error;

/// Failure of a single model invocation.
///
/// Every variant means "this turn produced no completion". Callers may retry
/// the whole request; [`LlmError::is_retryable`] tells transient failures apart.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request never got an HTTP response (connect, timeout, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    /// The endpoint answered 2xx but the body was not a usable completion.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl LlmError {
    /// Network failures, rate limits and server errors are worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Transport(_) => true,
            LlmError::Status { status, .. } => *status == 429 || *status >= 500,
            LlmError::Malformed(_) => false,
        }
    }
}
