use crate::ipc::helpers::{bool_param, parse_params, patch_param, reply, str_param};
use crate::ipc::types::{AppState, Request};
use crate::store::schools::{self, School};
use crate::store::StoreResult;

fn schools_create(state: &AppState, req: &Request) -> StoreResult<School> {
    let conn = state.conn()?;
    schools::create(conn, parse_params(&req.params)?)
}

fn schools_list(state: &AppState, req: &Request) -> StoreResult<Vec<School>> {
    let conn = state.conn()?;
    schools::list_all(conn, bool_param(req, "activeOnly"))
}

fn schools_get(state: &AppState, req: &Request) -> StoreResult<School> {
    let conn = state.conn()?;
    schools::get(conn, &str_param(req, "schoolId")?)
}

fn schools_get_by_name(state: &AppState, req: &Request) -> StoreResult<School> {
    let conn = state.conn()?;
    schools::get_by_name(conn, &str_param(req, "nombre")?)
}

fn schools_update(state: &AppState, req: &Request) -> StoreResult<School> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    schools::update(conn, &school_id, patch_param(req)?)
}

fn schools_delete(state: &AppState, req: &Request) -> StoreResult<School> {
    let conn = state.conn()?;
    schools::delete(conn, &str_param(req, "schoolId")?)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "schools.create" => Some(reply(req, "escuela", schools_create(state, req))),
        "schools.list" => Some(reply(req, "escuelas", schools_list(state, req))),
        "schools.get" => Some(reply(req, "escuela", schools_get(state, req))),
        "schools.getByName" => Some(reply(req, "escuela", schools_get_by_name(state, req))),
        "schools.update" => Some(reply(req, "escuela", schools_update(state, req))),
        "schools.delete" => Some(reply(req, "escuela", schools_delete(state, req))),
        _ => None,
    }
}
