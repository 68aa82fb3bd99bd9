use crate::store::StoreError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

/// Success envelope for methods that stand in for an HTTP route.
pub fn ok_with_status(id: &str, status: u16, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "status": status,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    status: u16,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
        "status": status,
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Internal failures are logged here and reach the caller only as a generic
/// message.
pub fn store_err(id: &str, e: &StoreError) -> serde_json::Value {
    if let StoreError::Internal(source) = e {
        tracing::error!(request_id = id, error = ?source, "request failed");
    }
    err(id, e.code(), e.to_string(), e.status(), None)
}
