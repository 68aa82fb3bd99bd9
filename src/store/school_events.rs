use crate::store::error::StoreResult;
use crate::store::fields::{flag, nullable, optional_text, required_text, text_or_null};
use crate::store::kind::EntityKind;
use crate::store::schools;
use crate::store::tenant::{self, new_id, now_ms, ListFilter, TenantRecord};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

/// A school-wide event type ("examen", "evento", "suspension", ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolEvent {
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
    #[serde(rename = "tipo")]
    pub category: String,
    #[serde(rename = "activo")]
    pub active: bool,
}

impl TenantRecord for SchoolEvent {
    const KIND: EntityKind = EntityKind::SchoolEvent;
    const COLUMNS: &'static str = "id, creation_time, escuela_id, nombre, descripcion, tipo, activo";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            creation_time: row.get(1)?,
            school_id: row.get(2)?,
            name: row.get(3)?,
            description: row.get(4)?,
            category: row.get(5)?,
            active: row.get(6)?,
        })
    }

    fn owner_id(&self) -> &str {
        &self.school_id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSchoolEvent {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "tipo")]
    pub category: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchoolEventPatch {
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "descripcion", default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(rename = "tipo", default)]
    pub category: Option<String>,
    #[serde(rename = "activo", default)]
    pub active: Option<bool>,
}

pub fn create(
    conn: &Connection,
    school_id: &str,
    input: NewSchoolEvent,
) -> StoreResult<SchoolEvent> {
    schools::get(conn, school_id)?;
    let name = required_text("nombre", &input.name)?;
    let category = required_text("tipo", &input.category)?;

    let id = new_id();
    tenant::insert(
        conn,
        EntityKind::SchoolEvent,
        &[
            ("id", Value::Text(id.clone())),
            ("creation_time", Value::Integer(now_ms())),
            ("escuela_id", Value::Text(school_id.to_string())),
            ("nombre", Value::Text(name)),
            ("descripcion", text_or_null(optional_text(input.description))),
            ("tipo", Value::Text(category)),
            ("activo", flag(true)),
        ],
    )?;
    get(conn, school_id, &id)
}

pub fn get(conn: &Connection, school_id: &str, id: &str) -> StoreResult<SchoolEvent> {
    tenant::get(conn, school_id, id)
}

pub fn list(
    conn: &Connection,
    school_id: &str,
    filter: &ListFilter,
) -> StoreResult<Vec<SchoolEvent>> {
    tenant::list(conn, school_id, filter)
}

pub fn update(
    conn: &Connection,
    school_id: &str,
    id: &str,
    patch: SchoolEventPatch,
) -> StoreResult<SchoolEvent> {
    let mut changes: Vec<(&'static str, Value)> = Vec::new();
    if let Some(v) = patch.name {
        changes.push(("nombre", Value::Text(required_text("nombre", &v)?)));
    }
    if let Some(v) = patch.description {
        changes.push(("descripcion", text_or_null(optional_text(v))));
    }
    if let Some(v) = patch.category {
        changes.push(("tipo", Value::Text(required_text("tipo", &v)?)));
    }
    if let Some(v) = patch.active {
        changes.push(("activo", flag(v)));
    }
    tenant::update(conn, school_id, id, changes)
}

pub fn delete(conn: &Connection, school_id: &str, id: &str) -> StoreResult<SchoolEvent> {
    tenant::remove(conn, school_id, id)
}
