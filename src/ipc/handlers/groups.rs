use crate::ipc::helpers::{list_filter, parse_params, patch_param, reply, str_param};
use crate::ipc::types::{AppState, Request};
use crate::store::groups::{self, Group};
use crate::store::StoreResult;

fn create(state: &AppState, req: &Request) -> StoreResult<Group> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    groups::create(conn, &school_id, parse_params(&req.params)?)
}

fn list(state: &AppState, req: &Request) -> StoreResult<Vec<Group>> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    groups::list(conn, &school_id, &list_filter(req))
}

fn get(state: &AppState, req: &Request) -> StoreResult<Group> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    groups::get(conn, &school_id, &str_param(req, "id")?)
}

fn update(state: &AppState, req: &Request) -> StoreResult<Group> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    let id = str_param(req, "id")?;
    groups::update(conn, &school_id, &id, patch_param(req)?)
}

fn delete(state: &AppState, req: &Request) -> StoreResult<Group> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    groups::delete(conn, &school_id, &str_param(req, "id")?)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "groups.create" => Some(reply(req, "grupo", create(state, req))),
        "groups.list" => Some(reply(req, "grupos", list(state, req))),
        "groups.get" => Some(reply(req, "grupo", get(state, req))),
        "groups.update" => Some(reply(req, "grupo", update(state, req))),
        "groups.delete" => Some(reply(req, "grupo", delete(state, req))),
        _ => None,
    }
}
