//! Student HTTP handlers.

use super::{removed, saved};
use crate::{error::HttpError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use finesdesk_core::models::StudentForm;
use serde_json::{json, Value};

/// List all students as `{ success, students }`.
pub async fn list_students(State(state): State<AppState>) -> Json<Value> {
    let store = state.read();
    Json(json!({ "success": true, "students": store.students() }))
}

/// Create a student.
///
/// # Errors
/// Returns 422 for missing fields or a duplicate student id or email.
pub async fn create_student(
    State(state): State<AppState>,
    Json(form): Json<StudentForm>,
) -> Result<Response, HttpError> {
    let student = state.write().create_student(&form)?;
    tracing::debug!(id = student.id, "student created");
    Ok(saved(StatusCode::CREATED, "Student added.", &student))
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(form): Json<StudentForm>,
) -> Result<Response, HttpError> {
    let student = state.write().update_student(id, &form)?;
    Ok(saved(StatusCode::OK, "Student updated.", &student))
}

/// Delete a student.
///
/// # Errors
/// Returns 404 for an unknown id and 409 while the student has unpaid fines.
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response, HttpError> {
    state.write().delete_student(id)?;
    Ok(removed("Student deleted."))
}
