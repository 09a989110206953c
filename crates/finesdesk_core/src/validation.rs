//! Field-keyed validation errors and required-field presence checks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Message attached to a field that failed the local presence check.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Mapping from form field name to the messages reported for it.
///
/// Fields iterate in name order so the rendered alert is stable regardless of
/// how the backend ordered its JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Create an empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` to the messages recorded for `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Field names that carry at least one entry.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Render the map as alert text.
    ///
    /// Each field becomes `"field: msg1, msg2"`; fields are newline separated.
    ///
    /// # Returns
    /// The joined display string, empty when there are no errors.
    pub fn display_string(&self) -> String {
        self.0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

impl From<BTreeMap<String, Vec<String>>> for FieldErrors {
    fn from(value: BTreeMap<String, Vec<String>>) -> Self {
        Self(value)
    }
}

impl<K, V> FromIterator<(K, V)> for FieldErrors
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (field, message) in iter {
            errors.push(field, message);
        }
        errors
    }
}

/// Form state edited inside a modal dialog.
///
/// Implementors list the fields that must be present before a request is sent.
/// Presence is the only local check; format rules belong to the backend.
pub trait FormModel: Clone + Default {
    /// Required fields as `(field name, current value)` pairs.
    fn required_fields(&self) -> Vec<(&'static str, &str)>;
}

/// Run the local presence check for `form`.
///
/// # Returns
/// `Ok(())` when every required field is non-blank.
///
/// # Errors
/// Returns a [`FieldErrors`] map with one [`REQUIRED_MESSAGE`] entry per blank
/// required field.
pub fn check_required<F: FormModel>(form: &F) -> Result<(), FieldErrors> {
    let errors: FieldErrors = form
        .required_fields()
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| (field, REQUIRED_MESSAGE))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
