use crate::store::error::{StoreError, StoreResult};
use rusqlite::types::Value;
use serde::{Deserialize, Deserializer};

/// Distinguishes an absent patch field (`None`) from an explicit `null`
/// (`Some(None)`). Use with `#[serde(default, deserialize_with = "nullable")]`.
pub fn nullable<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

pub fn required_text(field: &str, value: &str) -> StoreResult<String> {
    let t = value.trim();
    if t.is_empty() {
        return Err(StoreError::validation(format!("{field} must not be empty")));
    }
    Ok(t.to_string())
}

/// Blank strings are stored as NULL.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn text_or_null(value: Option<String>) -> Value {
    match value {
        Some(s) => Value::Text(s),
        None => Value::Null,
    }
}

pub fn real_or_null(value: Option<f64>) -> Value {
    match value {
        Some(v) => Value::Real(v),
        None => Value::Null,
    }
}

pub fn flag(value: bool) -> Value {
    Value::Integer(i64::from(value))
}
