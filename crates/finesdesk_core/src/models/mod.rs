//! Domain records served by the backend list endpoints, and their forms.

/// Per-month absence summaries.
pub mod absence;
/// School events.
pub mod event;
/// Fines issued to students.
pub mod fine;
/// Session and role scoping.
pub mod session;
/// Admin and secretary accounts.
pub mod staff;
/// Students.
pub mod student;

use crate::listing::Listable;
use serde::de::DeserializeOwned;
use std::fmt;

/// Backend resource a record or mutation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Students,
    Admins,
    Secretaries,
    Events,
    Fines,
    Absences,
}

impl Resource {
    /// Path segment under `/api`.
    pub fn path(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Admins => "admins",
            Self::Secretaries => "secretaries",
            Self::Events => "events",
            Self::Fines => "fines",
            Self::Absences => "absences",
        }
    }

    /// Domain-specific key some endpoints wrap their collection in.
    ///
    /// Endpoints that answer with `data`, `records` or a bare array return
    /// `None`; the envelope adapter checks those shapes on its own.
    pub fn collection_key(self) -> Option<&'static str> {
        match self {
            Self::Students => Some("students"),
            Self::Admins => Some("admins"),
            Self::Secretaries => Some("secretaries"),
            Self::Events => Some("events"),
            Self::Fines => Some("fines"),
            Self::Absences => None,
        }
    }

    /// Singular label used in messages.
    pub fn singular(self) -> &'static str {
        match self {
            Self::Students => "student",
            Self::Admins => "admin",
            Self::Secretaries => "secretary",
            Self::Events => "event",
            Self::Fines => "fine",
            Self::Absences => "absence record",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A record type fetched from one list endpoint.
pub trait Record: Listable + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Endpoint family this record is served from.
    const RESOURCE: Resource;

    /// Stable identity used for prefill keys and delete paths.
    fn record_id(&self) -> String;
}

pub use absence::AbsenceSummary;
pub use event::{Event, EventForm};
pub use fine::{Fine, FineForm, FineStatus};
pub use session::{Page, Role, Session, SessionUser};
pub use staff::{Admin, AdminForm, Secretary, SecretaryForm};
pub use student::{Student, StudentForm};
