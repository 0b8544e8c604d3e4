//! Server error type with HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::git::GitError;
use crate::server::envelope::Payload;

/// Handler result alias.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error type for route handlers.
///
/// Not-found conditions the caller can trigger map to 404; everything else
/// is a malformed store or an internal encode failure and maps to 500. The
/// body is a regular error payload, so the envelope stage wraps it like any
/// other response.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Repository query layer error
    #[error(transparent)]
    Git(#[from] GitError),

    /// Payload serialization failure
    #[error("internal error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Git(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(Payload::error(self.to_string()))).into_response()
    }
}
