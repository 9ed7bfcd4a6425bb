//! FX engine error types.

use std::time::Duration;

use thiserror::Error;

/// Errors a rate provider can signal.
///
/// The aggregator recovers from every variant by counting it against the
/// provider and moving on.
#[derive(Debug, Error)]
pub enum FxError {
    /// The request never produced a response.
    #[error("Transport error from {provider}: {message}")]
    Transport { provider: String, message: String },

    /// The upstream answered with a non-success status.
    #[error("{provider} returned HTTP {status}")]
    HttpStatus { provider: String, status: u16 },

    /// The body could not be interpreted.
    #[error("Malformed response from {provider}: {message}")]
    MalformedResponse { provider: String, message: String },

    /// The upstream answered with an empty body.
    #[error("Empty response from {0}")]
    EmptyResponse(String),

    /// The provider did not answer within the configured window.
    #[error("{provider} timed out after {elapsed:?}")]
    Timeout { provider: String, elapsed: Duration },

    /// Provider returned an error not covered above.
    #[error("Rate provider error: {0}")]
    ProviderError(String),

    /// Invalid provider or aggregator configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FxError {
    /// Map a reqwest failure onto the taxonomy.
    pub(crate) fn from_reqwest(provider: &str, err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return FxError::HttpStatus {
                provider: provider.to_string(),
                status: status.as_u16(),
            };
        }
        if err.is_decode() {
            return FxError::MalformedResponse {
                provider: provider.to_string(),
                message: err.to_string(),
            };
        }
        FxError::Transport {
            provider: provider.to_string(),
            message: err.to_string(),
        }
    }

    /// Check if retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FxError::Transport { .. } | FxError::Timeout { .. }
        ) || matches!(self, FxError::HttpStatus { status, .. } if *status == 429 || *status >= 500)
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
