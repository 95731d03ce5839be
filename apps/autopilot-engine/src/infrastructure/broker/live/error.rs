//! Live broker adapter error types.

use serde::Deserialize;
use thiserror::Error;

use crate::application::ports::BrokerError;

/// Error body returned by the broker gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayErrorResponse {
    /// Machine-readable code.
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Errors from the HTTP live broker adapter.
#[derive(Debug, Error, Clone)]
pub enum LiveBrokerError {
    /// Client could not be built or a request could not be sent.
    #[error("Network error: {0}")]
    Network(String),

    /// Gateway returned an error status.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code from the gateway.
        code: String,
        /// Error message from the gateway.
        message: String,
    },

    /// Order or modification was rejected.
    #[error("Order rejected: {0}")]
    Rejected(String),

    /// Token missing or refused.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Rate limited after exhausting retries.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: u64,
    },

    /// Resource not found.
    #[error("Not found: {path}")]
    NotFound {
        /// Request path.
        path: String,
    },

    /// Response body could not be decoded.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Max retries exceeded.
    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Last failure seen.
        last_error: String,
    },
}

impl LiveBrokerError {
    /// Map a not-found path to the position it referred to.
    fn position_from_path(path: &str) -> String {
        path.trim_start_matches("/positions/")
            .trim_end_matches("/close")
            .to_string()
    }
}

impl From<LiveBrokerError> for BrokerError {
    fn from(err: LiveBrokerError) -> Self {
        match err {
            LiveBrokerError::Network(message) => Self::ConnectionError { message },
            LiveBrokerError::MaxRetriesExceeded { .. } => Self::ConnectionError {
                message: err.to_string(),
            },
            LiveBrokerError::JsonParse(message) => Self::InvalidResponse { message },
            LiveBrokerError::Rejected(reason) => Self::OrderRejected { reason },
            LiveBrokerError::RateLimited { .. } => Self::RateLimited,
            LiveBrokerError::NotFound { path } => Self::PositionNotFound {
                position_id: LiveBrokerError::position_from_path(&path),
            },
            LiveBrokerError::AuthenticationFailed | LiveBrokerError::Api { .. } => Self::Unknown {
                message: err.to_string(),
            },
        }
    }
}
