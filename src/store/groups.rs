use crate::store::error::StoreResult;
use crate::store::fields::{flag, required_text};
use crate::store::kind::EntityKind;
use crate::store::schools;
use crate::store::tenant::{self, new_id, now_ms, ListFilter, TenantRecord};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, Value, ValueRef};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "1°")]
    First,
    #[serde(rename = "2°")]
    Second,
    #[serde(rename = "3°")]
    Third,
    #[serde(rename = "4°")]
    Fourth,
    #[serde(rename = "5°")]
    Fifth,
    #[serde(rename = "6°")]
    Sixth,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "1°",
            Self::Second => "2°",
            Self::Third => "3°",
            Self::Fourth => "4°",
            Self::Fifth => "5°",
            Self::Sixth => "6°",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1°" => Some(Self::First),
            "2°" => Some(Self::Second),
            "3°" => Some(Self::Third),
            "4°" => Some(Self::Fourth),
            "5°" => Some(Self::Fifth),
            "6°" => Some(Self::Sixth),
            _ => None,
        }
    }
}

impl FromSql for Grade {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Grade::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown grade {s:?}").into()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_creationTime")]
    pub creation_time: i64,
    #[serde(rename = "escuelaId")]
    pub school_id: String,
    #[serde(rename = "grado")]
    pub grade: Grade,
    /// e.g. "1°A".
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "activo")]
    pub active: bool,
}

impl TenantRecord for Group {
    const KIND: EntityKind = EntityKind::Group;
    const COLUMNS: &'static str = "id, creation_time, escuela_id, grado, nombre, activo";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            creation_time: row.get(1)?,
            school_id: row.get(2)?,
            grade: row.get(3)?,
            name: row.get(4)?,
            active: row.get(5)?,
        })
    }

    fn owner_id(&self) -> &str {
        &self.school_id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGroup {
    #[serde(rename = "grado")]
    pub grade: Grade,
    #[serde(rename = "nombre")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupPatch {
    #[serde(rename = "grado", default)]
    pub grade: Option<Grade>,
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "activo", default)]
    pub active: Option<bool>,
}

pub fn create(conn: &Connection, school_id: &str, input: NewGroup) -> StoreResult<Group> {
    schools::get(conn, school_id)?;
    let name = required_text("nombre", &input.name)?;

    let id = new_id();
    tenant::insert(
        conn,
        EntityKind::Group,
        &[
            ("id", Value::Text(id.clone())),
            ("creation_time", Value::Integer(now_ms())),
            ("escuela_id", Value::Text(school_id.to_string())),
            ("grado", Value::Text(input.grade.as_str().to_string())),
            ("nombre", Value::Text(name)),
            ("activo", flag(true)),
        ],
    )?;
    get(conn, school_id, &id)
}

pub fn get(conn: &Connection, school_id: &str, id: &str) -> StoreResult<Group> {
    tenant::get(conn, school_id, id)
}

pub fn list(conn: &Connection, school_id: &str, filter: &ListFilter) -> StoreResult<Vec<Group>> {
    tenant::list(conn, school_id, filter)
}

pub fn update(
    conn: &Connection,
    school_id: &str,
    id: &str,
    patch: GroupPatch,
) -> StoreResult<Group> {
    let mut changes: Vec<(&'static str, Value)> = Vec::new();
    if let Some(v) = patch.grade {
        changes.push(("grado", Value::Text(v.as_str().to_string())));
    }
    if let Some(v) = patch.name {
        changes.push(("nombre", Value::Text(required_text("nombre", &v)?)));
    }
    if let Some(v) = patch.active {
        changes.push(("activo", flag(v)));
    }
    tenant::update(conn, school_id, id, changes)
}

pub fn delete(conn: &Connection, school_id: &str, id: &str) -> StoreResult<Group> {
    tenant::remove(conn, school_id, id)
}
