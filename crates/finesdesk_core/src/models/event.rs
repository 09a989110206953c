//! School events that attendance is taken against.

use super::{Record, Resource};
use crate::listing::Listable;
use crate::validation::FormModel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: u64,
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Event {
    /// English month name of the event date, as used by the month filter.
    pub fn month_name(&self) -> String {
        self.date.format("%B").to_string()
    }
}

impl Listable for Event {
    fn search_fields(&self) -> Vec<Option<Cow<'_, str>>> {
        vec![
            Some(Cow::Borrowed(self.name.as_str())),
            self.location.as_deref().map(Cow::Borrowed),
        ]
    }

    fn category(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.month_name()))
    }
}

impl Record for Event {
    const RESOURCE: Resource = Resource::Events;

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

/// Event form; `date` stays a string so a half-typed value can sit in the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EventForm {
    pub name: String,
    pub date: String,
    pub location: String,
    pub description: String,
}

impl FormModel for EventForm {
    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("name", self.name.as_str()), ("date", self.date.as_str())]
    }
}

impl From<&Event> for EventForm {
    fn from(value: &Event) -> Self {
        Self {
            name: value.name.clone(),
            date: value.date.format("%Y-%m-%d").to_string(),
            location: value.location.clone().unwrap_or_default(),
            description: value.description.clone().unwrap_or_default(),
        }
    }
}
