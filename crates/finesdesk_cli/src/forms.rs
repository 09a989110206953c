//! `--set field=value` handling for create and edit dialogs.

use anyhow::bail;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Parse one `field=value` argument. The value may be empty or contain `=`.
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(format!("expected field=value, got '{}'", raw));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Copy of `form` with the given fields overwritten.
///
/// Field names are the form's wire names; unknown names are rejected so a
/// typo never turns into a silently blank field.
pub fn apply<F: Serialize + DeserializeOwned>(
    form: &F,
    fields: &[(String, String)],
) -> anyhow::Result<F> {
    let mut value = serde_json::to_value(form)?;
    let Some(object) = value.as_object_mut() else {
        bail!("form does not serialize to an object");
    };
    for (key, field_value) in fields {
        if !object.contains_key(key) {
            let known: Vec<&str> = object.keys().map(String::as_str).collect();
            bail!(
                "Unknown field '{}'. Expected one of: {}",
                key,
                known.join(", ")
            );
        }
        object.insert(key.clone(), Value::String(field_value.clone()));
    }
    Ok(serde_json::from_value(value)?)
}
