//! Admin and secretary HTTP handlers.
//!
//! The two lists use different envelopes: admins come back under `admins`,
//! secretaries under the generic `data` key.

use super::{removed, saved};
use crate::{error::HttpError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use finesdesk_core::models::{AdminForm, SecretaryForm};
use serde_json::{json, Value};

pub async fn list_admins(State(state): State<AppState>) -> Json<Value> {
    let store = state.read();
    Json(json!({ "success": true, "admins": store.admins() }))
}

pub async fn create_admin(
    State(state): State<AppState>,
    Json(form): Json<AdminForm>,
) -> Result<Response, HttpError> {
    let admin = state.write().create_admin(&form)?;
    Ok(saved(StatusCode::CREATED, "Admin added.", &admin))
}

pub async fn update_admin(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(form): Json<AdminForm>,
) -> Result<Response, HttpError> {
    let admin = state.write().update_admin(id, &form)?;
    Ok(saved(StatusCode::OK, "Admin updated.", &admin))
}

/// Delete an admin account.
///
/// # Errors
/// Returns 409 when it is the last admin.
pub async fn delete_admin(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response, HttpError> {
    state.write().delete_admin(id)?;
    Ok(removed("Admin deleted."))
}

pub async fn list_secretaries(State(state): State<AppState>) -> Json<Value> {
    let store = state.read();
    Json(json!({ "success": true, "data": store.secretaries() }))
}

pub async fn create_secretary(
    State(state): State<AppState>,
    Json(form): Json<SecretaryForm>,
) -> Result<Response, HttpError> {
    let secretary = state.write().create_secretary(&form)?;
    Ok(saved(StatusCode::CREATED, "Secretary added.", &secretary))
}

pub async fn update_secretary(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(form): Json<SecretaryForm>,
) -> Result<Response, HttpError> {
    let secretary = state.write().update_secretary(id, &form)?;
    Ok(saved(StatusCode::OK, "Secretary updated.", &secretary))
}

pub async fn delete_secretary(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response, HttpError> {
    state.write().delete_secretary(id)?;
    Ok(removed("Secretary deleted."))
}
