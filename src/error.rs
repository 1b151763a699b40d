//! Error handling
//!
//! One taxonomy for the whole service. Every error response body is
//! `{ok:false, message}` and the HTTP status carries the class. Internal
//! detail is logged, never leaked — except trainer output, which goes back
//! to the (trusted, teacher-only) caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::model::InferenceError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing/expired/malformed claim, or bad credentials. The message is
    /// user-facing; credential failures carry distinct texts by design.
    #[error("{0}")]
    Unauthorized(String),

    #[error("Access denied")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Classifier raised during label prediction.
    #[error("Prediction failed: {0}")]
    Inference(String),

    /// External trainer exited non-zero or timed out. Captured output is
    /// surfaced to the caller.
    #[error("{message}")]
    Training {
        message: String,
        stdout: String,
        stderr: String,
    },

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn unauthorized() -> Self {
        AppError::Unauthorized("Unauthorized".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Inference(_) | AppError::Training { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match &self {
            AppError::Training { message, stdout, stderr } => json!({
                "ok": false,
                "message": message,
                "stdout": stdout,
                "stderr": stderr,
            }),
            AppError::Internal(detail) => {
                tracing::error!("internal error: {}", detail);
                json!({ "ok": false, "message": self.to_string() })
            }
            AppError::Inference(detail) => {
                tracing::error!("inference error: {}", detail);
                json!({ "ok": false, "message": self.to_string() })
            }
            other => json!({ "ok": false, "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        AppError::Inference(err.0)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        AppError::unauthorized()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
