/// Error types for Story Service
///
/// Every fallible operation returns [`AppError`]; actix renders it through
/// [`ResponseError`] as `{ "status": "fail" | "error", "message": ... }`.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for story-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Object storage operation failed
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Resource not found (also used to hide stories the caller does not own)
    #[error("{0}")]
    NotFound(String),

    /// Unauthorized access
    #[error("{0}")]
    Unauthorized(String),

    /// Forbidden access
    #[error("{0}")]
    Forbidden(String),

    /// Bad request
    #[error("{0}")]
    BadRequest(String),

    /// Uploaded media exceeds the configured limit
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::StorageError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let kind = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "error"
        } else {
            "fail"
        };

        HttpResponse::build(status).json(serde_json::json!({
            "status": kind,
            "message": self.to_string(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<s3_utils::S3Error> for AppError {
    fn from(err: s3_utils::S3Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        AppError::BadRequest(format!("Invalid multipart payload: {}", err))
    }
}
