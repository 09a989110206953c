//! Monthly absence summaries. Read-only on the client.

use super::{Record, Resource};
use crate::listing::Listable;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AbsenceSummary {
    pub student_id: String,
    pub student_name: String,
    pub year_level: String,
    /// Month name, e.g. `September`.
    pub month: String,
    pub absences: u32,
    #[serde(default)]
    pub reason: Option<String>,
}

impl Listable for AbsenceSummary {
    fn search_fields(&self) -> Vec<Option<Cow<'_, str>>> {
        vec![
            Some(Cow::Borrowed(self.student_name.as_str())),
            self.reason.as_deref().map(Cow::Borrowed),
            Some(Cow::Borrowed(self.student_id.as_str())),
        ]
    }

    fn category(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.month.as_str()))
    }
}

impl Record for AbsenceSummary {
    const RESOURCE: Resource = Resource::Absences;

    fn record_id(&self) -> String {
        format!("{}-{}", self.student_id, self.month)
    }
}
