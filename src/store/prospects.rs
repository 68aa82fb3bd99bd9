//! Prospect leads: schools that signed up but are not provisioned yet.
//!
//! A lead is consumed exactly once by [`transfer`], which creates the school and
//! removes the lead inside one immediate transaction.

use crate::store::error::{is_unique_violation, StoreError, StoreResult};
use crate::store::fields::{optional_text, text_or_null};
use crate::store::kind::EntityKind;
use crate::store::schools::{self, NewSchool, School};
use crate::store::tenant::{self, immediate, new_id, now_ms};
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

const COLUMNS: &str = "id, creation_time, nombre, nombre_corto, email, direccion, telefono,
     director, logo_url, descripcion";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProspectLead {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_creationTime")]
    pub creation_time: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "nombreCorto")]
    pub short_name: String,
    pub email: String,
    #[serde(rename = "direccion", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "telefono", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(rename = "logoUrl", skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProspectLead {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            creation_time: row.get(1)?,
            name: row.get(2)?,
            short_name: row.get(3)?,
            email: row.get(4)?,
            address: row.get(5)?,
            phone: row.get(6)?,
            director: row.get(7)?,
            logo_url: row.get(8)?,
            description: row.get(9)?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProspect {
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "nombreCorto", default)]
    pub short_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "direccion", default)]
    pub address: Option<String>,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(rename = "logoUrl", default)]
    pub logo_url: Option<String>,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
}

/// Values supplied at transfer time take precedence over the lead's own.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferOverrides {
    #[serde(rename = "direccion", default)]
    pub address: Option<String>,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn find(conn: &Connection, id: &str) -> StoreResult<Option<ProspectLead>> {
    let sql = format!("SELECT {COLUMNS} FROM prospectos WHERE id = ?");
    Ok(conn.query_row(&sql, [id], ProspectLead::from_row).optional()?)
}

/// Creates a lead. The duplicate check and the insert share one write lock,
/// and the UNIQUE index on `email` backs the check.
pub fn create(conn: &Connection, input: NewProspect) -> StoreResult<ProspectLead> {
    let name = input.name.trim().to_string();
    let short_name = input.short_name.trim().to_string();
    let email = input.email.trim().to_string();
    if name.is_empty() || short_name.is_empty() || email.is_empty() {
        return Err(StoreError::validation(
            "nombre, nombreCorto and email are required",
        ));
    }
    if !is_valid_email(&email) {
        return Err(StoreError::validation("email format is not valid"));
    }

    let tx = immediate(conn)?;
    if get_by_email(&tx, &email)?.is_some() {
        return Err(duplicate_email());
    }

    let id = new_id();
    insert_lead(
        &tx,
        &[
            ("id", Value::Text(id.clone())),
            ("creation_time", Value::Integer(now_ms())),
            ("nombre", Value::Text(name)),
            ("nombre_corto", Value::Text(short_name)),
            ("email", Value::Text(email)),
            ("direccion", text_or_null(optional_text(input.address))),
            ("telefono", text_or_null(optional_text(input.phone))),
            ("director", text_or_null(optional_text(input.director))),
            ("logo_url", text_or_null(optional_text(input.logo_url))),
            ("descripcion", text_or_null(optional_text(input.description))),
        ],
    )?;

    let lead = find(&tx, &id)?.ok_or_else(|| {
        StoreError::Internal(anyhow::anyhow!("inserted prospect {id} not readable"))
    })?;
    tx.commit()?;
    tracing::info!(prospect_id = %lead.id, "prospect created");
    Ok(lead)
}

/// A UNIQUE violation on `email` means another writer registered it first.
fn insert_lead(conn: &Connection, fields: &[(&str, Value)]) -> StoreResult<()> {
    match tenant::insert(conn, EntityKind::ProspectLead, fields) {
        Ok(()) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(duplicate_email()),
        Err(e) => Err(e.into()),
    }
}

fn duplicate_email() -> StoreError {
    StoreError::Duplicate("a prospect with this email already exists".into())
}

pub fn list(conn: &Connection) -> StoreResult<Vec<ProspectLead>> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM prospectos ORDER BY rowid"))?;
    let rows = stmt
        .query_map([], ProspectLead::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get(conn: &Connection, id: &str) -> StoreResult<ProspectLead> {
    find(conn, id)?.ok_or(StoreError::NotFoundOrForbidden)
}

pub fn get_by_email(conn: &Connection, email: &str) -> StoreResult<Option<ProspectLead>> {
    let sql = format!("SELECT {COLUMNS} FROM prospectos WHERE email = ?");
    Ok(conn
        .query_row(&sql, [email.trim()], ProspectLead::from_row)
        .optional()?)
}

/// Removes a lead without creating a school.
pub fn delete(conn: &Connection, id: &str) -> StoreResult<ProspectLead> {
    let lead = get(conn, id)?;
    tenant::delete_row(conn, EntityKind::ProspectLead, id)?;
    Ok(lead)
}

/// Turns a lead into an active school and removes the lead. Either both
/// changes are committed or neither is.
pub fn transfer(
    conn: &Connection,
    prospect_id: &str,
    overrides: TransferOverrides,
) -> StoreResult<School> {
    let tx = immediate(conn)?;
    let lead = get(&tx, prospect_id)?;

    let school = schools::create(
        &tx,
        NewSchool {
            name: lead.name,
            short_name: lead.short_name,
            address: optional_text(overrides.address).or(lead.address),
            phone: optional_text(overrides.phone).or(lead.phone),
            email: Some(lead.email),
            director: optional_text(overrides.director).or(lead.director),
            logo_url: lead.logo_url,
            description: lead.description,
        },
    )?;

    if tenant::delete_row(&tx, EntityKind::ProspectLead, &lead.id)? != 1 {
        return Err(StoreError::NotFoundOrForbidden);
    }
    tx.commit()?;
    tracing::info!(prospect_id, school_id = %school.id, "prospect transferred to school");
    Ok(school)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        db::init_schema(&conn).expect("schema");
        conn
    }

    fn lead(email: &str) -> NewProspect {
        NewProspect {
            name: "Colegio X".into(),
            short_name: "CX".into(),
            email: email.into(),
            ..Default::default()
        }
    }

    fn school_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM escuelas", [], |r| r.get(0))
            .expect("count")
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("x@x.com"));
        assert!(!is_valid_email("x@x"));
        assert!(!is_valid_email("x x@x.com"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn missing_fields_and_bad_email_are_validation_errors() {
        let conn = conn();
        let err = create(
            &conn,
            NewProspect {
                short_name: "".into(),
                ..lead("x@x.com")
            },
        )
        .expect_err("missing");
        assert_eq!(err.status(), 400);
        let err = create(&conn, lead("not-an-email")).expect_err("bad email");
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let conn = conn();
        create(&conn, lead("x@x.com")).expect("first");
        let err = create(&conn, lead("x@x.com")).expect_err("second");
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(list(&conn).expect("list").len(), 1);
    }

    #[test]
    fn transfer_creates_school_and_consumes_lead() {
        let conn = conn();
        let p = create(
            &conn,
            NewProspect {
                phone: Some("555-0100".into()),
                director: Some("Lead Director".into()),
                ..lead("x@x.com")
            },
        )
        .expect("lead");

        let school = transfer(
            &conn,
            &p.id,
            TransferOverrides {
                director: Some("Override Director".into()),
                ..Default::default()
            },
        )
        .expect("transfer");

        assert!(school.active);
        assert_eq!(school.name, "Colegio X");
        assert_eq!(school.short_name, "CX");
        assert_eq!(school.email.as_deref(), Some("x@x.com"));
        assert_eq!(school.address, "");
        assert_eq!(school.phone.as_deref(), Some("555-0100"));
        assert_eq!(school.director.as_deref(), Some("Override Director"));

        assert!(matches!(get(&conn, &p.id), Err(StoreError::NotFoundOrForbidden)));
        assert_eq!(school_count(&conn), 1);
    }

    #[test]
    fn second_transfer_of_same_lead_changes_nothing() {
        let conn = conn();
        let p = create(&conn, lead("x@x.com")).expect("lead");
        transfer(&conn, &p.id, TransferOverrides::default()).expect("first");
        let err = transfer(&conn, &p.id, TransferOverrides::default()).expect_err("second");
        assert_eq!(err.status(), 404);
        assert_eq!(school_count(&conn), 1);
    }

    #[test]
    fn email_is_free_again_after_transfer() {
        let conn = conn();
        let p = create(&conn, lead("x@x.com")).expect("lead");
        transfer(&conn, &p.id, TransferOverrides::default()).expect("transfer");
        create(&conn, lead("x@x.com")).expect("re-register");
    }

    #[test]
    fn delete_removes_the_lead() {
        let conn = conn();
        let p = create(&conn, lead("x@x.com")).expect("lead");
        let removed = delete(&conn, &p.id).expect("delete");
        assert_eq!(removed.id, p.id);
        assert!(list(&conn).expect("list").is_empty());
        assert_eq!(school_count(&conn), 0);
    }

    #[test]
    fn failed_lead_removal_rolls_back_the_new_school() {
        let conn = conn();
        let p = create(&conn, lead("x@x.com")).expect("lead");
        conn.execute_batch(
            "CREATE TRIGGER keep_prospects BEFORE DELETE ON prospectos
             BEGIN SELECT RAISE(ABORT, 'prospects are read-only'); END;",
        )
        .expect("trigger");

        let err = transfer(&conn, &p.id, TransferOverrides::default()).expect_err("aborted");
        assert_eq!(err.code(), "internal");
        assert_eq!(school_count(&conn), 0);
        assert_eq!(get(&conn, &p.id).expect("lead kept"), p);
    }

    #[test]
    fn unique_index_on_email_reports_duplicate() {
        let conn = conn();
        create(&conn, lead("x@x.com")).expect("first");

        // Skips the lookup in `create`, as a concurrent writer would.
        let err = insert_lead(
            &conn,
            &[
                ("id", Value::Text(new_id())),
                ("creation_time", Value::Integer(now_ms())),
                ("nombre", Value::Text("Colegio Y".into())),
                ("nombre_corto", Value::Text("CY".into())),
                ("email", Value::Text("x@x.com".into())),
            ],
        )
        .expect_err("unique index");
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(list(&conn).expect("list").len(), 1);
    }

    #[test]
    fn other_constraint_failures_are_not_duplicates() {
        let conn = conn();
        let err = insert_lead(
            &conn,
            &[
                ("id", Value::Text(new_id())),
                ("creation_time", Value::Integer(now_ms())),
                ("nombre", Value::Text("Colegio Y".into())),
                ("nombre_corto", Value::Text("CY".into())),
                ("email", Value::Null),
            ],
        )
        .expect_err("not null");
        assert_eq!(err.code(), "internal");
    }
}
