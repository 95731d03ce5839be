//! HTTP response DTOs.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::ports::{JournalError, SessionError};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Live snapshot version (0 until the first update).
    pub snapshot_version: u64,
}

/// Response after replacing the live snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotUpdatedResponse {
    /// New snapshot version.
    pub version: u64,
}

/// Error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Error returned by a handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    /// Build an error.
    #[must_use]
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    /// 404 with a message.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "SESSION_UNAVAILABLE", err.to_string())
    }
}

impl From<JournalError> for ApiError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::InvalidEntry { .. } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_JOURNAL_ENTRY",
                err.to_string(),
            ),
            JournalError::Storage { .. } => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "JOURNAL_UNAVAILABLE",
                err.to_string(),
            ),
        }
    }
}
