use crate::ipc::error::{ok, store_err};
use crate::ipc::types::Request;
use crate::store::{ListFilter, StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn str_param(req: &Request, key: &str) -> StoreResult<String> {
    opt_str_param(req, key).ok_or_else(|| StoreError::validation(format!("missing {key}")))
}

/// Blank strings count as absent.
pub fn opt_str_param(req: &Request, key: &str) -> Option<String> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn bool_param(req: &Request, key: &str) -> bool {
    req.params
        .get(key)
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

/// Reads a form-style flag: `true`/`false`, `1`/`0` or their string spellings.
/// Absent or null is false; anything else is rejected instead of ignored.
pub fn flag_param(req: &Request, key: &str) -> StoreResult<bool> {
    let invalid = || StoreError::validation(format!("{key} must be a boolean"));
    match req.params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(false),
        Some(serde_json::Value::Bool(b)) => Ok(*b),
        Some(serde_json::Value::Number(n)) => match n.as_i64() {
            Some(1) => Ok(true),
            Some(0) => Ok(false),
            _ => Err(invalid()),
        },
        Some(serde_json::Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "on" | "yes" => Ok(true),
            "false" | "0" | "off" | "no" | "" => Ok(false),
            _ => Err(invalid()),
        },
        Some(_) => Err(invalid()),
    }
}

pub fn parse_params<T: DeserializeOwned>(value: &serde_json::Value) -> StoreResult<T> {
    serde_json::from_value(value.clone()).map_err(|e| StoreError::validation(e.to_string()))
}

pub fn patch_param<T: DeserializeOwned>(req: &Request) -> StoreResult<T> {
    match req.params.get("patch") {
        Some(p) if p.is_object() => parse_params(p),
        _ => Err(StoreError::validation("missing/invalid patch")),
    }
}

pub fn list_filter(req: &Request) -> ListFilter {
    ListFilter {
        active_only: bool_param(req, "activeOnly"),
        parent_id: opt_str_param(req, "cicloEscolarId"),
    }
}

/// Wraps a store result as `{ "<key>": value }` or an error envelope.
pub fn reply<T: Serialize>(req: &Request, key: &str, res: StoreResult<T>) -> serde_json::Value {
    let value = res.and_then(|v| Ok(serde_json::to_value(v)?));
    match value {
        Ok(v) => {
            let mut result = serde_json::Map::new();
            result.insert(key.to_string(), v);
            ok(&req.id, serde_json::Value::Object(result))
        }
        Err(e) => store_err(&req.id, &e),
    }
}
