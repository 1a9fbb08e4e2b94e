//! Application error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::services::ReviewError;
use crate::validation::ValidationError;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage unreachable or a query failed. Clients may retry.
    #[error("storage unavailable")]
    Storage(#[from] anyhow::Error),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed")]
    Validation(Vec<ValidationError>),
}

impl From<ReviewError> for AppError {
    fn from(error: ReviewError) -> Self {
        match error {
            ReviewError::Validation(errors) => AppError::Validation(errors),
            ReviewError::ProductNotFound => AppError::NotFound("product"),
            ReviewError::Storage(e) => AppError::Storage(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Storage(e) => {
                tracing::error!(error = %format!("{e:#}"), "storage error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": "storage unavailable", "retryable": true })),
                )
                    .into_response()
            }
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("{what} not found") })),
            )
                .into_response(),
            AppError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "validation failed", "fields": fields })),
            )
                .into_response(),
        }
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
