//! HTTP handlers, one module per resource family.

/// Absence summary endpoint.
pub mod absences;
/// Event endpoints.
pub mod events;
/// Fine endpoints, including payment.
pub mod fines;
/// Admin and secretary endpoints.
pub mod staff;
/// Student endpoints.
pub mod students;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

/// Success envelope for a create or update; the record rides under `data`.
pub(crate) fn saved<T: Serialize>(status: StatusCode, message: &str, record: &T) -> Response {
    (
        status,
        Json(json!({
            "success": true,
            "message": message,
            "data": record
        })),
    )
        .into_response()
}

pub(crate) fn removed(message: &str) -> Response {
    Json(json!({ "success": true, "message": message })).into_response()
}
