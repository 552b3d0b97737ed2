//! Extractor rejection mapping.
//!
//! Handlers take `Result<Json<T>, JsonRejection>` and
//! `Result<Path<T>, PathRejection>` and unwrap them here, so a malformed
//! body or path segment answers with the same `{"error": ..}` document as
//! every other failure instead of axum's plain-text rejection.

use axum::Json;
use axum::extract::Path;
use axum::extract::rejection::{JsonRejection, PathRejection};

use crate::error::AppError;

/// Unwrap a JSON body, reporting deserialization failures as validation errors.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(value)| value)
        .map_err(|err| AppError::Validation(err.body_text()))
}

/// Unwrap path parameters, reporting unparsable segments as validation errors.
pub fn extract_path<T>(result: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    result
        .map(|Path(value)| value)
        .map_err(|err| AppError::Validation(err.body_text()))
}
