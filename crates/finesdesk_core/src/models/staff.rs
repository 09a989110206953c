//! Admin and secretary accounts.

use super::{Record, Resource};
use crate::listing::Listable;
use crate::validation::FormModel;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Administrator account row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Admin {
    pub id: u64,
    pub name: String,
    pub email: String,
}

impl Listable for Admin {
    fn search_fields(&self) -> Vec<Option<Cow<'_, str>>> {
        vec![
            Some(Cow::Borrowed(self.name.as_str())),
            Some(Cow::Borrowed(self.email.as_str())),
        ]
    }

    // Admin lists have no category dropdown.
    fn category(&self) -> Option<Cow<'_, str>> {
        None
    }
}

impl Record for Admin {
    const RESOURCE: Resource = Resource::Admins;

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AdminForm {
    pub name: String,
    pub email: String,
}

impl FormModel for AdminForm {
    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("name", self.name.as_str()), ("email", self.email.as_str())]
    }
}

impl From<&Admin> for AdminForm {
    fn from(value: &Admin) -> Self {
        Self {
            name: value.name.clone(),
            email: value.email.clone(),
        }
    }
}

/// Secretary account row; secretaries may be assigned to one year level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Secretary {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub assigned_year: Option<String>,
}

impl Listable for Secretary {
    fn search_fields(&self) -> Vec<Option<Cow<'_, str>>> {
        vec![
            Some(Cow::Borrowed(self.name.as_str())),
            Some(Cow::Borrowed(self.email.as_str())),
        ]
    }

    fn category(&self) -> Option<Cow<'_, str>> {
        self.assigned_year.as_deref().map(Cow::Borrowed)
    }
}

impl Record for Secretary {
    const RESOURCE: Resource = Resource::Secretaries;

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SecretaryForm {
    pub name: String,
    pub email: String,
    pub assigned_year: String,
}

impl FormModel for SecretaryForm {
    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("name", self.name.as_str()), ("email", self.email.as_str())]
    }
}

impl From<&Secretary> for SecretaryForm {
    fn from(value: &Secretary) -> Self {
        Self {
            name: value.name.clone(),
            email: value.email.clone(),
            assigned_year: value.assigned_year.clone().unwrap_or_default(),
        }
    }
}
