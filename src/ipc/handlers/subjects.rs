use crate::ipc::helpers::{list_filter, parse_params, patch_param, reply, str_param};
use crate::ipc::types::{AppState, Request};
use crate::store::subjects::{self, Subject};
use crate::store::StoreResult;

fn create(state: &AppState, req: &Request) -> StoreResult<Subject> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    subjects::create(conn, &school_id, parse_params(&req.params)?)
}

fn list(state: &AppState, req: &Request) -> StoreResult<Vec<Subject>> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    subjects::list(conn, &school_id, &list_filter(req))
}

fn get(state: &AppState, req: &Request) -> StoreResult<Subject> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    subjects::get(conn, &school_id, &str_param(req, "id")?)
}

fn update(state: &AppState, req: &Request) -> StoreResult<Subject> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    let id = str_param(req, "id")?;
    subjects::update(conn, &school_id, &id, patch_param(req)?)
}

fn delete(state: &AppState, req: &Request) -> StoreResult<Subject> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    subjects::delete(conn, &school_id, &str_param(req, "id")?)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.create" => Some(reply(req, "materia", create(state, req))),
        "subjects.list" => Some(reply(req, "materias", list(state, req))),
        "subjects.get" => Some(reply(req, "materia", get(state, req))),
        "subjects.update" => Some(reply(req, "materia", update(state, req))),
        "subjects.delete" => Some(reply(req, "materia", delete(state, req))),
        _ => None,
    }
}
