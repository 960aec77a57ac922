use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::forms::ValidationErrors;

/// AppError
///
/// The per-request failure taxonomy. Only lookup misses and malformed input are
/// errors at all: uniqueness conflicts and authorization denials are expressed as
/// redirects by the handlers and never pass through here. Nothing in this type is
/// fatal to the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// An id-based lookup missed. The only condition allowed to abort a request.
    #[error("not found")]
    NotFound,

    /// Form validation failed; carries the field-level messages for the client.
    #[error("validation failed")]
    Validation(ValidationErrors),

    /// An unexpected internal failure (e.g. token encoding). Logged at the site.
    #[error("internal error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": "not found" })),
            )
                .into_response(),
            AppError::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "internal error" })),
            )
                .into_response(),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}
