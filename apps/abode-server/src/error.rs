//! API error taxonomy with HTTP status code mapping.
//!
//! Nothing in the engine retries: every failure is either absorbed locally
//! (geocoding degradation) or surfaced here with an actionable message.

use abode_storage::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed required input; surfaced verbatim to the caller.
    #[error("{0}")]
    Validation(String),
    /// Well-formed request that the lifecycle rules forbid; the message
    /// states the violated rule.
    #[error("{0}")]
    Policy(String),
    #[error("{0}")]
    NotFound(String),
    /// Resubmission of an already-verified record and similar duplicates.
    #[error("{0}")]
    Conflict(String),
    /// Object-storage failure; fatal to the whole submission.
    #[error("evidence upload failed: {0}")]
    EvidenceUpload(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Policy(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::EvidenceUpload(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound("verification record not found".to_string()),
            StoreError::Backend(msg) => ApiError::Internal(format!("storage error: {}", msg)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
