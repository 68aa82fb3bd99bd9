use crate::store::error::{StoreError, StoreResult};
use crate::store::fields::{flag, nullable, optional_text, required_text, text_or_null};
use crate::store::kind::EntityKind;
use crate::store::tenant::{self, new_id, now_ms, TenantRecord};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct School {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_creationTime")]
    pub creation_time: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "nombreCorto")]
    pub short_name: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "telefono", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(rename = "logoUrl", skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "activa")]
    pub active: bool,
}

impl TenantRecord for School {
    const KIND: EntityKind = EntityKind::School;
    const COLUMNS: &'static str = "id, creation_time, nombre, nombre_corto, direccion, telefono,
         email, director, logo_url, descripcion, activa";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            creation_time: row.get(1)?,
            name: row.get(2)?,
            short_name: row.get(3)?,
            address: row.get(4)?,
            phone: row.get(5)?,
            email: row.get(6)?,
            director: row.get(7)?,
            logo_url: row.get(8)?,
            description: row.get(9)?,
            active: row.get(10)?,
        })
    }

    fn owner_id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSchool {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "nombreCorto")]
    pub short_name: String,
    #[serde(rename = "direccion", default)]
    pub address: Option<String>,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(rename = "logoUrl", default)]
    pub logo_url: Option<String>,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchoolPatch {
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "nombreCorto", default)]
    pub short_name: Option<String>,
    #[serde(rename = "direccion", default)]
    pub address: Option<String>,
    #[serde(rename = "telefono", default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub director: Option<Option<String>>,
    #[serde(rename = "logoUrl", default, deserialize_with = "nullable")]
    pub logo_url: Option<Option<String>>,
    #[serde(rename = "descripcion", default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(rename = "activa", default)]
    pub active: Option<bool>,
}

/// Inserts a new active school. The address defaults to an empty string.
pub fn create(conn: &Connection, input: NewSchool) -> StoreResult<School> {
    let name = required_text("nombre", &input.name)?;
    let short_name = required_text("nombreCorto", &input.short_name)?;
    let id = new_id();

    tenant::insert(
        conn,
        EntityKind::School,
        &[
            ("id", Value::Text(id.clone())),
            ("creation_time", Value::Integer(now_ms())),
            ("nombre", Value::Text(name)),
            ("nombre_corto", Value::Text(short_name)),
            (
                "direccion",
                Value::Text(optional_text(input.address).unwrap_or_default()),
            ),
            ("telefono", text_or_null(optional_text(input.phone))),
            ("email", text_or_null(optional_text(input.email))),
            ("director", text_or_null(optional_text(input.director))),
            ("logo_url", text_or_null(optional_text(input.logo_url))),
            ("descripcion", text_or_null(optional_text(input.description))),
            ("activa", flag(true)),
        ],
    )?;
    tracing::debug!(school_id = %id, "school inserted");
    get(conn, &id)
}

/// A school is its own tenant: it is readable only under its own id.
pub fn get(conn: &Connection, school_id: &str) -> StoreResult<School> {
    tenant::get::<School>(conn, school_id, school_id)
}

pub fn list_all(conn: &Connection, active_only: bool) -> StoreResult<Vec<School>> {
    let sql = if active_only {
        format!(
            "SELECT {} FROM escuelas WHERE activa = 1 ORDER BY rowid",
            School::COLUMNS
        )
    } else {
        format!("SELECT {} FROM escuelas ORDER BY rowid", School::COLUMNS)
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], School::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Resolves the school shown under a URL slug. The earliest school with that
/// exact name wins.
pub fn get_by_name(conn: &Connection, name: &str) -> StoreResult<School> {
    let sql = format!(
        "SELECT {} FROM escuelas WHERE nombre = ? ORDER BY rowid LIMIT 1",
        School::COLUMNS
    );
    conn.query_row(&sql, [name.trim()], School::from_row)
        .optional()?
        .ok_or(StoreError::NotFoundOrForbidden)
}

pub fn update(conn: &Connection, school_id: &str, patch: SchoolPatch) -> StoreResult<School> {
    let mut changes: Vec<(&'static str, Value)> = Vec::new();
    if let Some(v) = patch.name {
        changes.push(("nombre", Value::Text(required_text("nombre", &v)?)));
    }
    if let Some(v) = patch.short_name {
        changes.push(("nombre_corto", Value::Text(required_text("nombreCorto", &v)?)));
    }
    if let Some(v) = patch.address {
        changes.push(("direccion", Value::Text(v.trim().to_string())));
    }
    if let Some(v) = patch.phone {
        changes.push(("telefono", text_or_null(optional_text(v))));
    }
    if let Some(v) = patch.email {
        changes.push(("email", text_or_null(optional_text(v))));
    }
    if let Some(v) = patch.director {
        changes.push(("director", text_or_null(optional_text(v))));
    }
    if let Some(v) = patch.logo_url {
        changes.push(("logo_url", text_or_null(optional_text(v))));
    }
    if let Some(v) = patch.description {
        changes.push(("descripcion", text_or_null(optional_text(v))));
    }
    if let Some(v) = patch.active {
        changes.push(("activa", flag(v)));
    }
    tenant::update::<School>(conn, school_id, school_id, changes)
}

pub fn delete(conn: &Connection, school_id: &str) -> StoreResult<School> {
    tenant::remove::<School>(conn, school_id, school_id)
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

    fn inst(name: &str) -> NewSchool {
        NewSchool {
            name: name.into(),
            short_name: "IA".into(),
            ..Default::default()
        }
    }

    #[test]
    fn create_stamps_active_and_default_address() {
        let conn = conn();
        let s = create(&conn, inst("Inst A")).expect("create");
        assert!(s.active);
        assert_eq!(s.address, "");
        assert!(s.creation_time > 0);
        assert_eq!(get(&conn, &s.id).expect("get"), s);
    }

    #[test]
    fn create_rejects_blank_name() {
        let conn = conn();
        let err = create(&conn, inst("  ")).expect_err("blank name");
        assert_eq!(err.code(), "bad_params");
    }

    #[test]
    fn get_by_name_matches_exact_name() {
        let conn = conn();
        let a = create(&conn, inst("Inst A")).expect("a");
        let _b = create(&conn, inst("Inst B")).expect("b");
        assert_eq!(get_by_name(&conn, "Inst A").expect("by name").id, a.id);
        assert!(matches!(
            get_by_name(&conn, "Inst"),
            Err(StoreError::NotFoundOrForbidden)
        ));
    }

    #[test]
    fn update_is_partial_and_delete_is_soft() {
        let conn = conn();
        let s = create(
            &conn,
            NewSchool {
                director: Some("Ana".into()),
                ..inst("Inst A")
            },
        )
        .expect("create");

        let patched = update(
            &conn,
            &s.id,
            SchoolPatch {
                phone: Some(Some("555".into())),
                ..Default::default()
            },
        )
        .expect("update");
        assert_eq!(patched.phone.as_deref(), Some("555"));
        assert_eq!(patched.director.as_deref(), Some("Ana"));
        assert_eq!(patched.name, "Inst A");

        let deleted = delete(&conn, &s.id).expect("delete");
        assert!(!deleted.active);
        assert_eq!(list_all(&conn, true).expect("active").len(), 0);
        assert_eq!(list_all(&conn, false).expect("all").len(), 1);
    }
}
