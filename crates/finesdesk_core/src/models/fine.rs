//! Fines issued to students for attendance violations.

use super::{Record, Resource};
use crate::listing::Listable;
use crate::validation::FormModel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FineStatus {
    Unpaid,
    Paid,
}

impl FineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for FineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fine {
    pub id: u64,
    pub student_id: String,
    pub student_name: String,
    pub violation: String,
    pub amount: f64,
    pub status: FineStatus,
    pub issued_on: NaiveDate,
}

impl Listable for Fine {
    fn search_fields(&self) -> Vec<Option<Cow<'_, str>>> {
        vec![
            Some(Cow::Borrowed(self.student_name.as_str())),
            Some(Cow::Borrowed(self.violation.as_str())),
            Some(Cow::Borrowed(self.student_id.as_str())),
        ]
    }

    fn category(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.status.as_str()))
    }
}

impl Record for Fine {
    const RESOURCE: Resource = Resource::Fines;

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

/// Fine form. `amount` is kept as typed text; the backend parses it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FineForm {
    pub student_id: String,
    pub violation: String,
    pub amount: String,
}

impl FormModel for FineForm {
    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("student_id", self.student_id.as_str()),
            ("violation", self.violation.as_str()),
            ("amount", self.amount.as_str()),
        ]
    }
}

impl From<&Fine> for FineForm {
    fn from(value: &Fine) -> Self {
        Self {
            student_id: value.student_id.clone(),
            violation: value.violation.clone(),
            amount: format!("{:.2}", value.amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_as_lowercase() {
        let fine: Fine = serde_json::from_value(serde_json::json!({
            "id": 1,
            "student_id": "2024-0001",
            "student_name": "Luis Santos",
            "violation": "Absent at flag ceremony",
            "amount": 50.0,
            "status": "unpaid",
            "issued_on": "2024-09-02"
        }))
        .expect("fine");
        assert_eq!(fine.status, FineStatus::Unpaid);
        assert_eq!(fine.category().as_deref(), Some("unpaid"));
        assert_eq!(FineForm::from(&fine).amount, "50.00");
    }
}
