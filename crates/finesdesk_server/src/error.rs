//! HTTP error mapping for API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use finesdesk_core::FieldErrors;
use serde_json::json;
use thiserror::Error;

/// Message sent alongside a field error map.
pub const INVALID_DATA_MESSAGE: &str = "The given data was invalid.";

/// Handler failure, rendered as a `success: false` envelope.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("{0}")]
    NotFound(String),

    /// Field-keyed validation failure (422).
    #[error("Validation failed:\n{0}")]
    Validation(FieldErrors),

    /// Business-rule refusal (409).
    #[error("{0}")]
    Conflict(String),
}

impl HttpError {
    #[cfg(test)]
    fn invalid(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(field, message);
        Self::Validation(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(errors) => json!({
                "success": false,
                "message": INVALID_DATA_MESSAGE,
                "errors": errors,
            }),
            Self::NotFound(message) | Self::Conflict(message) => {
                tracing::debug!(status = status.as_u16(), "{}", message);
                json!({ "success": false, "message": message })
            }
        };
        (status, Json(body)).into_response()
    }
}
