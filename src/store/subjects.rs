use crate::store::error::{StoreError, StoreResult};
use crate::store::fields::{flag, nullable, optional_text, real_or_null, required_text, text_or_null};
use crate::store::kind::EntityKind;
use crate::store::schools;
use crate::store::tenant::{self, new_id, now_ms, ListFilter, TenantRecord};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subject {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_creationTime")]
    pub creation_time: i64,
    #[serde(rename = "escuelaId")]
    pub school_id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "creditos", skip_serializing_if = "Option::is_none")]
    pub credits: Option<f64>,
    #[serde(rename = "activa")]
    pub active: bool,
}

impl TenantRecord for Subject {
    const KIND: EntityKind = EntityKind::Subject;
    const COLUMNS: &'static str =
        "id, creation_time, escuela_id, nombre, descripcion, creditos, activa";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            creation_time: row.get(1)?,
            school_id: row.get(2)?,
            name: row.get(3)?,
            description: row.get(4)?,
            credits: row.get(5)?,
            active: row.get(6)?,
        })
    }

    fn owner_id(&self) -> &str {
        &self.school_id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSubject {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "creditos", default)]
    pub credits: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubjectPatch {
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "descripcion", default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(rename = "creditos", default, deserialize_with = "nullable")]
    pub credits: Option<Option<f64>>,
    #[serde(rename = "activa", default)]
    pub active: Option<bool>,
}

fn check_credits(credits: Option<f64>) -> StoreResult<Option<f64>> {
    match credits {
        Some(c) if !c.is_finite() || c < 0.0 => Err(StoreError::validation(
            "creditos must be a non-negative number",
        )),
        other => Ok(other),
    }
}

pub fn create(conn: &Connection, school_id: &str, input: NewSubject) -> StoreResult<Subject> {
    schools::get(conn, school_id)?;
    let name = required_text("nombre", &input.name)?;
    let credits = check_credits(input.credits)?;

    let id = new_id();
    tenant::insert(
        conn,
        EntityKind::Subject,
        &[
            ("id", Value::Text(id.clone())),
            ("creation_time", Value::Integer(now_ms())),
            ("escuela_id", Value::Text(school_id.to_string())),
            ("nombre", Value::Text(name)),
            ("descripcion", text_or_null(optional_text(input.description))),
            ("creditos", real_or_null(credits)),
            ("activa", flag(true)),
        ],
    )?;
    get(conn, school_id, &id)
}

pub fn get(conn: &Connection, school_id: &str, id: &str) -> StoreResult<Subject> {
    tenant::get(conn, school_id, id)
}

pub fn list(conn: &Connection, school_id: &str, filter: &ListFilter) -> StoreResult<Vec<Subject>> {
    tenant::list(conn, school_id, filter)
}

pub fn update(
    conn: &Connection,
    school_id: &str,
    id: &str,
    patch: SubjectPatch,
) -> StoreResult<Subject> {
    let mut changes: Vec<(&'static str, Value)> = Vec::new();
    if let Some(v) = patch.name {
        changes.push(("nombre", Value::Text(required_text("nombre", &v)?)));
    }
    if let Some(v) = patch.description {
        changes.push(("descripcion", text_or_null(optional_text(v))));
    }
    if let Some(v) = patch.credits {
        changes.push(("creditos", real_or_null(check_credits(v)?)));
    }
    if let Some(v) = patch.active {
        changes.push(("activa", flag(v)));
    }
    tenant::update(conn, school_id, id, changes)
}

pub fn delete(conn: &Connection, school_id: &str, id: &str) -> StoreResult<Subject> {
    tenant::remove(conn, school_id, id)
}
