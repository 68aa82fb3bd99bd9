//! Prospect lead methods. The four sign-up routes are also reachable under
//! their HTTP route names, and their envelopes carry the HTTP status.

use crate::ipc::error::{ok_with_status, store_err};
use crate::ipc::helpers::{flag_param, opt_str_param, parse_params, reply, str_param};
use crate::ipc::types::{AppState, Request};
use crate::store::prospects::{self, NewProspect, ProspectLead, TransferOverrides};
use crate::store::{StoreError, StoreResult};
use serde_json::json;

fn route(req: &Request, status: u16, res: StoreResult<serde_json::Value>) -> serde_json::Value {
    match res {
        Ok(result) => ok_with_status(&req.id, status, result),
        Err(e) => store_err(&req.id, &e),
    }
}

/// POST /api/prospectos
fn create_route(state: &AppState, req: &Request) -> StoreResult<serde_json::Value> {
    let conn = state.conn()?;
    let input: NewProspect = parse_params(&req.params)?;
    let activate = flag_param(req, "activarEscuela")?;
    let lead = prospects::create(conn, input)?;

    if activate {
        let school = prospects::transfer(conn, &lead.id, TransferOverrides::default())?;
        return Ok(json!({
            "success": true,
            "message": "prospect created and school activated",
            "prospecto": lead,
            "escuela": school,
        }));
    }
    Ok(json!({
        "success": true,
        "message": "prospect created",
        "prospecto": lead,
    }))
}

/// GET /api/prospectos
fn list_route(state: &AppState) -> StoreResult<serde_json::Value> {
    let leads = prospects::list(state.conn()?)?;
    Ok(json!({ "success": true, "prospectos": leads }))
}

/// PATCH /api/prospectos
fn activate_route(state: &AppState, req: &Request) -> StoreResult<serde_json::Value> {
    let conn = state.conn()?;
    let email = opt_str_param(req, "email")
        .ok_or_else(|| StoreError::validation("email is required"))?;
    let lead = prospects::get_by_email(conn, &email)?.ok_or(StoreError::NotFoundOrForbidden)?;
    let school = prospects::transfer(conn, &lead.id, TransferOverrides::default())?;
    Ok(json!({
        "success": true,
        "message": "school activated",
        "escuela": school,
    }))
}

/// POST /api/prospectos/transferir
fn transfer_route(state: &AppState, req: &Request) -> StoreResult<serde_json::Value> {
    let conn = state.conn()?;
    let prospect_id = opt_str_param(req, "prospectoId")
        .ok_or_else(|| StoreError::validation("prospectoId is required"))?;
    let overrides: TransferOverrides = parse_params(&req.params)?;
    let school = prospects::transfer(conn, &prospect_id, overrides)?;
    Ok(json!({
        "success": true,
        "message": "prospect transferred to school",
        "escuela": school,
    }))
}

fn get(state: &AppState, req: &Request) -> StoreResult<ProspectLead> {
    prospects::get(state.conn()?, &str_param(req, "id")?)
}

fn get_by_email(state: &AppState, req: &Request) -> StoreResult<ProspectLead> {
    prospects::get_by_email(state.conn()?, &str_param(req, "email")?)?
        .ok_or(StoreError::NotFoundOrForbidden)
}

fn delete(state: &AppState, req: &Request) -> StoreResult<ProspectLead> {
    prospects::delete(state.conn()?, &str_param(req, "id")?)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "prospectos.create" | "POST /api/prospectos" => {
            Some(route(req, 201, create_route(state, req)))
        }
        "prospectos.list" | "GET /api/prospectos" => Some(route(req, 200, list_route(state))),
        "prospectos.activate" | "PATCH /api/prospectos" => {
            Some(route(req, 200, activate_route(state, req)))
        }
        "prospectos.transfer" | "POST /api/prospectos/transferir" => {
            Some(route(req, 200, transfer_route(state, req)))
        }
        "prospectos.get" => Some(reply(req, "prospecto", get(state, req))),
        "prospectos.getByEmail" => Some(reply(req, "prospecto", get_by_email(state, req))),
        "prospectos.delete" => Some(reply(req, "prospecto", delete(state, req))),
        _ => None,
    }
}
