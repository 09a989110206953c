//! Boundary adapter for backend response bodies.
//!
//! Endpoints disagree on shape: some answer with a bare array, some with
//! `{ success, data }`, `{ success, records }` or `{ success, <domain> }`, and
//! mutations add `message` and a field-keyed `errors` map. Every body goes
//! through [`normalize`] so nothing past this point looks at raw JSON keys.

use crate::constants::FALLBACK_ERROR_MESSAGE;
use crate::error::AppError;
use crate::validation::FieldErrors;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

const GENERIC_COLLECTION_KEYS: [&str; 2] = ["data", "records"];

/// One response mapped into `{ ok, data, error }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub ok: bool,
    pub data: Option<Value>,
    pub error: Option<AppError>,
    /// Success message the backend attached, if any.
    pub message: Option<String>,
}

impl Normalized {
    fn success(data: Option<Value>, message: Option<String>) -> Self {
        Self {
            ok: true,
            data,
            error: None,
            message,
        }
    }

    fn failure(error: AppError) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error),
            message: None,
        }
    }

    /// Convert into a `Result`, surfacing the error of a failed response.
    ///
    /// # Errors
    /// Returns the normalized error when `ok` is false.
    pub fn into_result(self) -> Result<Normalized, AppError> {
        if self.ok {
            Ok(self)
        } else {
            Err(self
                .error
                .unwrap_or_else(|| AppError::Rejected(FALLBACK_ERROR_MESSAGE.to_string())))
        }
    }

    /// Decode the collection carried by a successful list response.
    ///
    /// # Errors
    /// Returns the response error for failed responses, or
    /// [`AppError::Decode`] when no collection is present or rows do not
    /// match `T`.
    pub fn into_records<T: DeserializeOwned>(self) -> Result<Vec<T>, AppError> {
        let normalized = self.into_result()?;
        let data = normalized
            .data
            .ok_or_else(|| AppError::Decode("response carried no record collection".to_string()))?;
        if !data.is_array() {
            return Err(AppError::Decode(
                "record collection is not an array".to_string(),
            ));
        }
        serde_json::from_value(data).map_err(|err| AppError::Decode(err.to_string()))
    }
}

fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Parse an `errors` object; each entry may be a list of strings or a single
/// string.
fn parse_field_errors(value: Option<&Value>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let Some(Value::Object(map)) = value else {
        return errors;
    };
    for (field, messages) in map {
        match messages {
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(text) => errors.push(field.as_str(), text.as_str()),
                        other => errors.push(field.as_str(), other.to_string()),
                    }
                }
            }
            Value::String(text) => errors.push(field.as_str(), text.as_str()),
            Value::Null => {}
            other => errors.push(field.as_str(), other.to_string()),
        }
    }
    errors
}

fn collection_from_object(map: &Map<String, Value>, collection_key: Option<&str>) -> Option<Value> {
    GENERIC_COLLECTION_KEYS
        .iter()
        .copied()
        .chain(collection_key)
        .find_map(|key| map.get(key).filter(|value| !value.is_null()).cloned())
}

fn normalize_object(
    status: u16,
    map: &Map<String, Value>,
    collection_key: Option<&str>,
) -> Normalized {
    let success_flag = map.get("success").and_then(Value::as_bool);
    let error_text = non_empty_string(map.get("error"));
    let message = non_empty_string(map.get("message")).or(error_text);
    let failed = !is_success_status(status) || success_flag == Some(false);
    if failed {
        let errors = parse_field_errors(map.get("errors"));
        let error = if errors.is_empty() {
            AppError::Rejected(message.unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string()))
        } else {
            AppError::Validation(errors)
        };
        return Normalized::failure(error);
    }
    Normalized::success(collection_from_object(map, collection_key), message)
}

/// Map a response status and body into a [`Normalized`] value.
///
/// # Arguments
/// - `status`: HTTP status code.
/// - `body`: Parsed JSON body, `None` when the body was empty.
/// - `collection_key`: Domain key the endpoint may wrap its list in.
///
/// # Returns
/// A normalized response; failures carry [`AppError::Validation`] when a
/// non-empty field map is present and [`AppError::Rejected`] otherwise.
pub fn normalize(status: u16, body: Option<Value>, collection_key: Option<&str>) -> Normalized {
    match body {
        None | Some(Value::Null) => {
            if is_success_status(status) {
                Normalized::success(None, None)
            } else {
                Normalized::failure(AppError::Rejected(FALLBACK_ERROR_MESSAGE.to_string()))
            }
        }
        Some(Value::Object(map)) => normalize_object(status, &map, collection_key),
        Some(other) => {
            if is_success_status(status) {
                Normalized::success(Some(other), None)
            } else {
                Normalized::failure(AppError::Rejected(FALLBACK_ERROR_MESSAGE.to_string()))
            }
        }
    }
}

/// Parse a raw body and normalize it; non-JSON bodies on failure statuses keep
/// their text as the rejection message.
pub fn normalize_text(status: u16, text: &str, collection_key: Option<&str>) -> Normalized {
    if text.trim().is_empty() {
        return normalize(status, None, collection_key);
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value) => normalize(status, Some(value), collection_key),
        Err(err) if is_success_status(status) => {
            Normalized::failure(AppError::Decode(format!("invalid JSON body: {}", err)))
        }
        Err(_) => Normalized::failure(AppError::Rejected(text.trim().to_string())),
    }
}
