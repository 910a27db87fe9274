//! Assistant error types.

use thiserror::Error;

/// Errors that can occur when talking to the generative-AI service.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (missing or invalid API key).
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

    /// The reply arrived but did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Translated message key shown to the user.
    pub fn message_key(&self) -> &'static str {
        match self {
            ProviderError::RateLimited { .. } => "error.ai.rateLimited",
            ProviderError::AuthenticationFailed(_) => "error.ai.auth",
            ProviderError::Timeout(_) | ProviderError::NetworkError(_) => "error.ai.unreachable",
            ProviderError::ModelNotFound(_)
            | ProviderError::ApiError { .. }
            | ProviderError::MalformedResponse(_) => "error.ai.failed",
        }
    }

    /// Whether triggering the same action again cannot succeed without a
    /// configuration change.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }

    /// Suggested wait before the user retries, when the service gave one.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_and_missing_model_are_permanent() {
        assert!(ProviderError::AuthenticationFailed("bad key".into()).is_permanent());
        assert!(ProviderError::ModelNotFound("x".into()).is_permanent());
        assert!(!ProviderError::Timeout(60).is_permanent());
    }

    #[test]
    fn rate_limit_exposes_delay() {
        let err = ProviderError::RateLimited {
            retry_after_ms: 5000,
        };
        assert_eq!(err.retry_after_ms(), Some(5000));
        assert_eq!(err.message_key(), "error.ai.rateLimited");
        assert_eq!(ProviderError::NetworkError("x".into()).retry_after_ms(), None);
    }
}
