//! Backend seam: list fetches and single-record mutations.

use finesdesk_core::envelope::Normalized;
use finesdesk_core::invalidation::Change;
use finesdesk_core::{AppError, Record, Resource};
use serde_json::Value;
use std::fmt;
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        })
    }
}

/// One outbound write against a resource endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub resource: Resource,
    pub method: Method,
    pub id: Option<String>,
    /// Trailing action segment, e.g. `pay` in `/api/fines/{id}/pay`.
    pub action: Option<&'static str>,
    pub body: Option<Value>,
}

impl Mutation {
    pub fn create(resource: Resource, body: Value) -> Self {
        Self {
            resource,
            method: Method::Post,
            id: None,
            action: None,
            body: Some(body),
        }
    }

    pub fn update(resource: Resource, id: impl Into<String>, body: Value) -> Self {
        Self {
            resource,
            method: Method::Put,
            id: Some(id.into()),
            action: None,
            body: Some(body),
        }
    }

    pub fn delete(resource: Resource, id: impl Into<String>) -> Self {
        Self {
            resource,
            method: Method::Delete,
            id: Some(id.into()),
            action: None,
            body: None,
        }
    }

    pub fn pay_fine(id: impl Into<String>) -> Self {
        Self {
            resource: Resource::Fines,
            method: Method::Patch,
            id: Some(id.into()),
            action: Some("pay"),
            body: None,
        }
    }

    /// Path segments below the server root, e.g. `["api", "fines", "3", "pay"]`.
    pub fn segments(&self) -> Vec<&str> {
        let mut segments = vec!["api", self.resource.path()];
        if let Some(id) = self.id.as_deref() {
            segments.push(id);
        }
        if let Some(action) = self.action {
            segments.push(action);
        }
        segments
    }

    /// Invalidation notice to publish once this mutation succeeded.
    pub fn change(&self, response: &Normalized) -> Change {
        match (self.method, self.id.clone()) {
            (Method::Delete, Some(id)) => Change::Deleted { id },
            (_, Some(id)) => Change::Updated { id },
            (_, None) => Change::Created {
                id: response.data.as_ref().and_then(created_id),
            },
        }
    }
}

fn created_id(data: &Value) -> Option<String> {
    match data.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Transport to the REST backend.
///
/// Implementations return `Ok` for every response that arrived, successful or
/// not, already passed through the envelope adapter; `Err` is reserved for
/// requests that produced no response.
pub trait Backend: Clone + Send + Sync + 'static {
    /// `GET /api/<resource>`.
    fn list(&self, resource: Resource)
        -> impl Future<Output = Result<Normalized, AppError>> + Send;

    /// Send one mutation.
    fn mutate(&self, mutation: &Mutation)
        -> impl Future<Output = Result<Normalized, AppError>> + Send;
}

/// Fetch and decode the full collection for `R`.
///
/// # Errors
/// Returns transport failures, backend rejections, and
/// [`AppError::Decode`] when the rows do not match `R`.
pub async fn fetch_records<R: Record, B: Backend>(backend: &B) -> Result<Vec<R>, AppError> {
    backend.list(R::RESOURCE).await?.into_records()
}
