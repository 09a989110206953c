//! Event HTTP handlers.

use super::{removed, saved};
use crate::{error::HttpError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use finesdesk_core::models::{Event, EventForm};

/// List events as a bare JSON array.
pub async fn list_events(State(state): State<AppState>) -> Json<Vec<Event>> {
    Json(state.read().events().to_vec())
}

/// Create an event.
///
/// # Errors
/// Returns 422 when `name` or `date` is missing or the date does not parse.
pub async fn create_event(
    State(state): State<AppState>,
    Json(form): Json<EventForm>,
) -> Result<Response, HttpError> {
    let event = state.write().create_event(&form)?;
    Ok(saved(StatusCode::CREATED, "Event added.", &event))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(form): Json<EventForm>,
) -> Result<Response, HttpError> {
    let event = state.write().update_event(id, &form)?;
    Ok(saved(StatusCode::OK, "Event updated.", &event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response, HttpError> {
    state.write().delete_event(id)?;
    Ok(removed("Event deleted."))
}
