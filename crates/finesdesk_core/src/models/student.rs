//! Student records and the create/update form.

use super::{Record, Resource};
use crate::listing::Listable;
use crate::validation::FormModel;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Student row as returned by `GET /api/students`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Student {
    pub id: u64,
    /// School-issued identifier, e.g. `2024-0113`.
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub year_level: String,
    #[serde(default)]
    pub section: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Listable for Student {
    fn search_fields(&self) -> Vec<Option<Cow<'_, str>>> {
        vec![
            Some(Cow::Owned(self.full_name())),
            self.email.as_deref().map(Cow::Borrowed),
            Some(Cow::Borrowed(self.student_id.as_str())),
        ]
    }

    fn category(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.year_level.as_str()))
    }
}

impl Record for Student {
    const RESOURCE: Resource = Resource::Students;

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

/// Payload for `POST /api/students` and `PUT /api/students/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StudentForm {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub year_level: String,
    pub section: String,
}

impl FormModel for StudentForm {
    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("student_id", self.student_id.as_str()),
            ("first_name", self.first_name.as_str()),
            ("last_name", self.last_name.as_str()),
            ("year_level", self.year_level.as_str()),
        ]
    }
}

impl From<&Student> for StudentForm {
    fn from(value: &Student) -> Self {
        Self {
            student_id: value.student_id.clone(),
            first_name: value.first_name.clone(),
            last_name: value.last_name.clone(),
            email: value.email.clone().unwrap_or_default(),
            year_level: value.year_level.clone(),
            section: value.section.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::check_required;

    #[test]
    fn student_deserializes_with_missing_optional_fields() {
        let student: Student = serde_json::from_value(serde_json::json!({
            "id": 7,
            "student_id": "2024-0007",
            "first_name": "Ana",
            "last_name": "Reyes",
            "year_level": "2nd Year"
        }))
        .expect("student");
        assert_eq!(student.email, None);
        assert_eq!(student.full_name(), "Ana Reyes");
        assert_eq!(student.record_id(), "7");
    }

    #[test]
    fn prefilled_form_passes_required_check() {
        let student = Student {
            id: 1,
            student_id: "2024-0001".to_string(),
            first_name: "Luis".to_string(),
            last_name: "Santos".to_string(),
            email: None,
            year_level: "1st Year".to_string(),
            section: Some("B".to_string()),
        };
        let form = StudentForm::from(&student);
        assert_eq!(form.email, "");
        assert_eq!(form.section, "B");
        assert!(check_required(&form).is_ok());
    }
}
