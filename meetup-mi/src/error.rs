//! Error types for meetup-mi
//!
//! Every handler error renders as
//! `{"error": {"code": ..., "message": ..., "details": ...}}`; `details` is
//! present only for import failures that carry structured context.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use meetup_common::ImportError;
use serde_json::{json, Value};
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409), e.g. an imported email already stored
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upload exceeds the configured body limit (413)
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Fatal import failure (400 or 422)
    #[error(transparent)]
    Import(#[from] ImportError),

    /// meetup-common error
    #[error("Common error: {0}")]
    Common(meetup_common::Error),
}

impl From<meetup_common::Error> for ApiError {
    fn from(err: meetup_common::Error) -> Self {
        if err.is_unique_violation() {
            return ApiError::Conflict(format!(
                "A member with this email already exists; nothing was imported ({})",
                err
            ));
        }

        match err {
            meetup_common::Error::Import(e) => ApiError::Import(e),
            meetup_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            meetup_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Common(other),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) | ApiError::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Import(ImportError::NoValidRecords { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Import(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Import(err) => err.code(),
            ApiError::Common(_) => "COMMON_ERROR",
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ApiError::Import(ImportError::MissingRequiredColumn { expected, found }) => {
                Some(json!({ "expected": expected, "found": found }))
            }
            ApiError::Import(ImportError::NoValidRecords { rejected }) => {
                let errors: Vec<String> = rejected.iter().map(ToString::to_string).collect();
                Some(json!({ "errors": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let message = match &self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::Internal(msg) => msg.clone(),
            ApiError::Import(err) => err.to_string(),
            ApiError::Common(err) => err.to_string(),
        };

        let mut error = json!({
            "code": self.code(),
            "message": message,
        });
        if let Some(details) = self.details() {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
