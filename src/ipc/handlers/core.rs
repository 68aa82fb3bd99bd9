use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::opt_str_param;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

/// Reports whether the store can serve tenant requests yet, and where it
/// keeps its data.
fn handle_health(state: &AppState, req: &Request) -> serde_json::Value {
    let db_path = state
        .workspace
        .as_ref()
        .map(|p| p.join(db::DB_FILE).to_string_lossy().to_string());
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspaceOpen": state.db.is_some(),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "dbPath": db_path,
        }),
    )
}

/// Opens (creating if needed) the store under `path`. A failed open keeps the
/// previously selected workspace.
fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(path) = opt_str_param(req, "path").map(PathBuf::from) else {
        return err(&req.id, "bad_params", "missing path", 400, None);
    };

    let conn = match db::open_db(&path) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(workspace = %path.display(), error = ?e, "workspace open failed");
            return err(&req.id, "db_open_failed", "could not open workspace", 500, None);
        }
    };
    if let Some(previous) = state.workspace.replace(path.clone()) {
        tracing::info!(previous = %previous.display(), "closing workspace");
    }
    state.db = Some(conn);
    tracing::info!(workspace = %path.display(), "workspace opened");
    ok(
        &req.id,
        json!({
            "workspacePath": path.to_string_lossy(),
            "dbPath": path.join(db::DB_FILE).to_string_lossy(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
