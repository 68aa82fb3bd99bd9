use crate::ipc::helpers::{list_filter, parse_params, patch_param, reply, str_param};
use crate::ipc::types::{AppState, Request};
use crate::store::cycles::{self, AcademicCycle};
use crate::store::StoreResult;

fn create(state: &AppState, req: &Request) -> StoreResult<AcademicCycle> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    cycles::create(conn, &school_id, parse_params(&req.params)?)
}

fn list(state: &AppState, req: &Request) -> StoreResult<Vec<AcademicCycle>> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    cycles::list(conn, &school_id, &list_filter(req))
}

fn get(state: &AppState, req: &Request) -> StoreResult<AcademicCycle> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    cycles::get(conn, &school_id, &str_param(req, "id")?)
}

fn update(state: &AppState, req: &Request) -> StoreResult<AcademicCycle> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    let id = str_param(req, "id")?;
    cycles::update(conn, &school_id, &id, patch_param(req)?)
}

fn delete(state: &AppState, req: &Request) -> StoreResult<AcademicCycle> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    cycles::delete(conn, &school_id, &str_param(req, "id")?)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "cycles.create" => Some(reply(req, "ciclo", create(state, req))),
        "cycles.list" => Some(reply(req, "ciclos", list(state, req))),
        "cycles.get" => Some(reply(req, "ciclo", get(state, req))),
        "cycles.update" => Some(reply(req, "ciclo", update(state, req))),
        "cycles.delete" => Some(reply(req, "ciclo", delete(state, req))),
        _ => None,
    }
}
