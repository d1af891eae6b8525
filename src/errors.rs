use crate::services::{content_service::ContentError, object_service::StorageError};
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Message shown to end users for any failed upload.
pub const UPLOAD_FAILED: &str = "Upload failed";

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for 401 Unauthorized
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

/// Storage failures. Configuration details stay in the logs; end users only
/// learn that the upload failed.
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Configuration(_) => {
                tracing::error!("storage misconfigured: {}", err);
                AppError::internal("Internal Server Error")
            }
            StorageError::InvalidInput(reason) => {
                AppError::bad_request(format!("{}: {}", UPLOAD_FAILED, reason))
            }
            StorageError::UploadFailed { .. } | StorageError::DeleteFailed { .. } => {
                tracing::error!("{}: {:?}", err, std::error::Error::source(&err));
                AppError::new(StatusCode::BAD_GATEWAY, UPLOAD_FAILED)
            }
            StorageError::ResolveFailed { .. } => {
                tracing::error!("{}: {:?}", err, std::error::Error::source(&err));
                AppError::internal("Internal Server Error")
            }
        }
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound(_) => AppError::not_found(err.to_string()),
            ContentError::AlreadyExists(_) => AppError::new(StatusCode::CONFLICT, err.to_string()),
            ContentError::Validation(msg) => AppError::bad_request(msg),
            ContentError::Sqlx(inner) => {
                tracing::error!("database error: {}", inner);
                AppError::internal("Internal Server Error")
            }
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::new(err.status(), format!("{}: {}", UPLOAD_FAILED, err.body_text()))
    }
}
