//! Absence summary handler.

use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// List monthly absence summaries as `{ success, records }`.
pub async fn list_absences(State(state): State<AppState>) -> Json<Value> {
    let store = state.read();
    Json(json!({ "success": true, "records": store.absences() }))
}
