use crate::ipc::helpers::{list_filter, parse_params, patch_param, reply, str_param};
use crate::ipc::types::{AppState, Request};
use crate::store::calendar::{self, CalendarEvent};
use crate::store::StoreResult;

fn create(state: &AppState, req: &Request) -> StoreResult<CalendarEvent> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    calendar::create(conn, &school_id, parse_params(&req.params)?)
}

// `cicloEscolarId` narrows the list to one academic cycle.
fn list(state: &AppState, req: &Request) -> StoreResult<Vec<CalendarEvent>> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    calendar::list(conn, &school_id, &list_filter(req))
}

fn get(state: &AppState, req: &Request) -> StoreResult<CalendarEvent> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    calendar::get(conn, &school_id, &str_param(req, "id")?)
}

fn update(state: &AppState, req: &Request) -> StoreResult<CalendarEvent> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    let id = str_param(req, "id")?;
    calendar::update(conn, &school_id, &id, patch_param(req)?)
}

fn delete(state: &AppState, req: &Request) -> StoreResult<CalendarEvent> {
    let conn = state.conn()?;
    let school_id = str_param(req, "schoolId")?;
    calendar::delete(conn, &school_id, &str_param(req, "id")?)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "calendar.create" => Some(reply(req, "evento", create(state, req))),
        "calendar.list" => Some(reply(req, "eventos", list(state, req))),
        "calendar.get" => Some(reply(req, "evento", get(state, req))),
        "calendar.update" => Some(reply(req, "evento", update(state, req))),
        "calendar.delete" => Some(reply(req, "evento", delete(state, req))),
        _ => None,
    }
}
