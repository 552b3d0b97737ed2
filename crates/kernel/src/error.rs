//! Application error types.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Application errors.
///
/// Every failure a caller can observe maps to exactly one variant, and each
/// variant maps to one HTTP status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing, invalid or expired credentials")]
    Unauthenticated,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("please verify your email before continuing")]
    EmailNotVerified,

    #[error("this action requires the owner role")]
    InsufficientRole,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("you do not have permission to modify this resource")]
    Forbidden,

    #[error("invalid verification code")]
    InvalidCode,

    #[error("verification code has expired")]
    ExpiredCode,

    #[error("{0} already exists")]
    AlreadyExists(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("storage unavailable")]
    StorageUnavailable(#[from] StoreError),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::EmailNotVerified | AppError::InsufficientRole | AppError::Forbidden => {
                StatusCode::FORBIDDEN
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidCode => StatusCode::BAD_REQUEST,
            AppError::ExpiredCode => StatusCode::GONE,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Infrastructure failures are logged in full and reported vaguely
        let message = match &self {
            AppError::StorageUnavailable(e) => {
                tracing::error!(error = %e, "storage error");
                "service temporarily unavailable".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({ "error": message }));

        if matches!(self, AppError::Unauthenticated) {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
