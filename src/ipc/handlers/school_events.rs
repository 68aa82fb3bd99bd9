use crate::ipc::helpers::{list_filter, parse_params, patch_param, reply, str_param};
use crate::ipc::types::{AppState, Request};
use crate::store::school_events::{self, SchoolEvent};
use crate::store::StoreResult;

fn create(state: &AppState, req: &Request) -> StoreResult<SchoolEvent> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    school_events::create(conn, &school_id, parse_params(&req.params)?)
}

fn list(state: &AppState, req: &Request) -> StoreResult<Vec<SchoolEvent>> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    school_events::list(conn, &school_id, &list_filter(req))
}

fn get(state: &AppState, req: &Request) -> StoreResult<SchoolEvent> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    school_events::get(conn, &school_id, &str_param(req, "id")?)
}

fn update(state: &AppState, req: &Request) -> StoreResult<SchoolEvent> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    let id = str_param(req, "id")?;
    school_events::update(conn, &school_id, &id, patch_param(req)?)
}

fn delete(state: &AppState, req: &Request) -> StoreResult<SchoolEvent> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    school_events::delete(conn, &school_id, &str_param(req, "id")?)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "schoolEvents.create" => Some(reply(req, "eventoEscolar", create(state, req))),
        "schoolEvents.list" => Some(reply(req, "eventosEscolares", list(state, req))),
        "schoolEvents.get" => Some(reply(req, "eventoEscolar", get(state, req))),
        "schoolEvents.update" => Some(reply(req, "eventoEscolar", update(state, req))),
        "schoolEvents.delete" => Some(reply(req, "eventoEscolar", delete(state, req))),
        _ => None,
    }
}
