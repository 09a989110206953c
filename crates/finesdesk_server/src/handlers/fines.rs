//! Fine HTTP handlers.

use super::{removed, saved};
use crate::{error::HttpError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use finesdesk_core::models::FineForm;
use serde_json::{json, Value};

pub async fn list_fines(State(state): State<AppState>) -> Json<Value> {
    let store = state.read();
    Json(json!({ "success": true, "data": store.fines() }))
}

/// Issue a fine dated today.
///
/// # Errors
/// Returns 422 for an unknown student or a non-positive amount.
pub async fn create_fine(
    State(state): State<AppState>,
    Json(form): Json<FineForm>,
) -> Result<Response, HttpError> {
    let today = chrono::Local::now().date_naive();
    let fine = state.write().create_fine(&form, today)?;
    tracing::debug!(id = fine.id, student = %fine.student_id, "fine issued");
    Ok(saved(StatusCode::CREATED, "Fine issued.", &fine))
}

pub async fn update_fine(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(form): Json<FineForm>,
) -> Result<Response, HttpError> {
    let fine = state.write().update_fine(id, &form)?;
    Ok(saved(StatusCode::OK, "Fine updated.", &fine))
}

pub async fn delete_fine(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response, HttpError> {
    state.write().delete_fine(id)?;
    Ok(removed("Fine deleted."))
}

/// Mark a fine paid.
///
/// # Errors
/// Returns 404 for an unknown id and 409 when it is already paid.
pub async fn pay_fine(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response, HttpError> {
    let fine = state.write().pay_fine(id)?;
    Ok(saved(StatusCode::OK, "Fine marked as paid.", &fine))
}
