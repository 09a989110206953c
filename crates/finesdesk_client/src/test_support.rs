//! In-process [`Backend`] double for unit tests.

use crate::api::{Backend, Mutation};
use finesdesk_core::envelope::{normalize, Normalized};
use finesdesk_core::{AppError, Resource};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct StubState {
    lists: HashMap<Resource, Value>,
    list_calls: usize,
    offline: bool,
    reply: Option<(u16, Value)>,
    sent: Vec<Mutation>,
}

/// Serves canned list bodies and records every mutation it receives.
#[derive(Clone, Default)]
pub(crate) struct StubBackend {
    state: Arc<Mutex<StubState>>,
}

impl StubBackend {
    fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().expect("stub state")
    }

    /// Body returned by the next `GET` for `resource`.
    pub(crate) fn set_list(&self, resource: Resource, body: Value) {
        self.state().lists.insert(resource, body);
    }

    /// Make list requests fail as if the server were unreachable.
    pub(crate) fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Status and body returned for mutations; defaults to `200 {success: true}`.
    pub(crate) fn reply_with(&self, status: u16, body: Value) {
        self.state().reply = Some((status, body));
    }

    pub(crate) fn sent(&self) -> Vec<Mutation> {
        self.state().sent.clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.state().list_calls
    }
}

impl Backend for StubBackend {
    async fn list(&self, resource: Resource) -> Result<Normalized, AppError> {
        let mut state = self.state();
        state.list_calls += 1;
        if state.offline {
            return Err(AppError::Transport("connection refused".to_string()));
        }
        let body = state
            .lists
            .get(&resource)
            .cloned()
            .unwrap_or_else(|| json!([]));
        Ok(normalize(200, Some(body), resource.collection_key()))
    }

    async fn mutate(&self, mutation: &Mutation) -> Result<Normalized, AppError> {
        let mut state = self.state();
        state.sent.push(mutation.clone());
        let (status, body) = state
            .reply
            .clone()
            .unwrap_or_else(|| (200, json!({ "success": true })));
        Ok(normalize(status, Some(body), None))
    }
}

/// `{ success, students: [...] }` body with `count` generated students.
pub(crate) fn students_body(count: usize) -> Value {
    let rows: Vec<Value> = (1..=count)
        .map(|n| {
            json!({
                "id": n,
                "student_id": format!("2024-{:04}", n),
                "first_name": format!("Student{}", n),
                "last_name": if n % 2 == 0 { "Reyes" } else { "Santos" },
                "email": format!("s{}@school.edu", n),
                "year_level": if n % 3 == 0 { "2nd Year" } else { "1st Year" },
            })
        })
        .collect();
    json!({ "success": true, "students": rows })
}
