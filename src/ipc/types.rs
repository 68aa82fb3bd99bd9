use crate::store::{StoreError, StoreResult};
use rusqlite::Connection;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// The only process-wide state is the open workspace. The current school is
/// never remembered here; every tenant-scoped request names it in `schoolId`.
#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
}

impl AppState {
    pub fn conn(&self) -> StoreResult<&Connection> {
        self.db.as_ref().ok_or(StoreError::NoWorkspace)
    }
}
