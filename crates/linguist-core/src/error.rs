//! Generator error types.
//!
//! These errors represent failures when delegating to a generative-language
//! backend. Defined in `linguist-core` so callers can classify failures
//! without string matching; there is no automatic retry anywhere — a failure
//! is surfaced once and retry is a manual user action.

use thiserror::Error;

/// Errors that can occur when interacting with a content generator.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The backend replied, but with nothing usable.
    #[error("generator returned an empty payload")]
    EmptyPayload,

    /// The backend replied with content that does not match the exercise
    /// contract.
    #[error("generator returned a malformed payload: {0}")]
    MalformedPayload(String),
}

impl GeneratorError {
    /// Returns `true` if this error is permanent — retrying the same request
    /// without fixing configuration cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            GeneratorError::AuthenticationFailed(_) | GeneratorError::ModelNotFound(_)
        )
    }
}
