use crate::store::error::{StoreError, StoreResult};
use crate::store::fields::{flag, required_text};
use crate::store::kind::EntityKind;
use crate::store::schools;
use crate::store::tenant::{self, new_id, now_ms, ListFilter, TenantRecord};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcademicCycle {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_creationTime")]
    pub creation_time: i64,
    #[serde(rename = "escuelaId")]
    pub school_id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "fechaInicio")]
    pub starts_at: i64,
    #[serde(rename = "fechaFin")]
    pub ends_at: i64,
    #[serde(rename = "activo")]
    pub active: bool,
}

impl TenantRecord for AcademicCycle {
    const KIND: EntityKind = EntityKind::AcademicCycle;
    const COLUMNS: &'static str =
        "id, creation_time, escuela_id, nombre, fecha_inicio, fecha_fin, activo";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            creation_time: row.get(1)?,
            school_id: row.get(2)?,
            name: row.get(3)?,
            starts_at: row.get(4)?,
            ends_at: row.get(5)?,
            active: row.get(6)?,
        })
    }

    fn owner_id(&self) -> &str {
        &self.school_id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCycle {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "fechaInicio")]
    pub starts_at: i64,
    #[serde(rename = "fechaFin")]
    pub ends_at: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CyclePatch {
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "fechaInicio", default)]
    pub starts_at: Option<i64>,
    #[serde(rename = "fechaFin", default)]
    pub ends_at: Option<i64>,
    #[serde(rename = "activo", default)]
    pub active: Option<bool>,
}

fn check_range(starts_at: i64, ends_at: i64) -> StoreResult<()> {
    if starts_at > ends_at {
        return Err(StoreError::validation(
            "fechaInicio must not be after fechaFin",
        ));
    }
    Ok(())
}

pub fn create(conn: &Connection, school_id: &str, input: NewCycle) -> StoreResult<AcademicCycle> {
    schools::get(conn, school_id)?;
    let name = required_text("nombre", &input.name)?;
    check_range(input.starts_at, input.ends_at)?;

    let id = new_id();
    tenant::insert(
        conn,
        EntityKind::AcademicCycle,
        &[
            ("id", Value::Text(id.clone())),
            ("creation_time", Value::Integer(now_ms())),
            ("escuela_id", Value::Text(school_id.to_string())),
            ("nombre", Value::Text(name)),
            ("fecha_inicio", Value::Integer(input.starts_at)),
            ("fecha_fin", Value::Integer(input.ends_at)),
            ("activo", flag(true)),
        ],
    )?;
    get(conn, school_id, &id)
}

pub fn get(conn: &Connection, school_id: &str, id: &str) -> StoreResult<AcademicCycle> {
    tenant::get(conn, school_id, id)
}

pub fn list(
    conn: &Connection,
    school_id: &str,
    filter: &ListFilter,
) -> StoreResult<Vec<AcademicCycle>> {
    tenant::list(conn, school_id, filter)
}

/// The date range is checked after merging, so moving only one end of the
/// range cannot invert it. The read, the check and the write share one write
/// lock.
pub fn update(
    conn: &Connection,
    school_id: &str,
    id: &str,
    patch: CyclePatch,
) -> StoreResult<AcademicCycle> {
    let tx = tenant::immediate(conn)?;
    let current = get(&tx, school_id, id)?;
    check_range(
        patch.starts_at.unwrap_or(current.starts_at),
        patch.ends_at.unwrap_or(current.ends_at),
    )?;

    let mut changes: Vec<(&'static str, Value)> = Vec::new();
    if let Some(v) = patch.name {
        changes.push(("nombre", Value::Text(required_text("nombre", &v)?)));
    }
    if let Some(v) = patch.starts_at {
        changes.push(("fecha_inicio", Value::Integer(v)));
    }
    if let Some(v) = patch.ends_at {
        changes.push(("fecha_fin", Value::Integer(v)));
    }
    if let Some(v) = patch.active {
        changes.push(("activo", flag(v)));
    }
    let updated = tenant::apply_update(&tx, school_id, id, changes)?;
    tx.commit()?;
    Ok(updated)
}

pub fn delete(conn: &Connection, school_id: &str, id: &str) -> StoreResult<AcademicCycle> {
    tenant::remove(conn, school_id, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::store::schools::NewSchool;

    const T0: i64 = 1_722_470_400_000;
    const T1: i64 = 1_751_328_000_000;

    fn setup() -> (Connection, String, String) {
        let conn = Connection::open_in_memory().expect("open");
        db::init_schema(&conn).expect("schema");
        let a = schools::create(
            &conn,
            NewSchool {
                name: "Inst A".into(),
                short_name: "A".into(),
                ..Default::default()
            },
        )
        .expect("school a");
        let b = schools::create(
            &conn,
            NewSchool {
                name: "Inst B".into(),
                short_name: "B".into(),
                ..Default::default()
            },
        )
        .expect("school b");
        (conn, a.id, b.id)
    }

    fn cycle(name: &str) -> NewCycle {
        NewCycle {
            name: name.into(),
            starts_at: T0,
            ends_at: T1,
        }
    }

    #[test]
    fn cycle_is_invisible_to_other_schools() {
        let (conn, a, b) = setup();
        let c = create(&conn, &a, cycle("2024-2025")).expect("create");
        assert_eq!(c.school_id, a);
        assert!(c.active);

        assert!(matches!(
            get(&conn, &b, &c.id),
            Err(StoreError::NotFoundOrForbidden)
        ));
        assert!(matches!(
            update(
                &conn,
                &b,
                &c.id,
                CyclePatch {
                    name: Some("hijacked".into()),
                    ..Default::default()
                }
            ),
            Err(StoreError::NotFoundOrForbidden)
        ));
        assert!(matches!(
            delete(&conn, &b, &c.id),
            Err(StoreError::NotFoundOrForbidden)
        ));
        assert_eq!(get(&conn, &a, &c.id).expect("still intact"), c);
    }

    #[test]
    fn missing_and_foreign_ids_fail_the_same_way() {
        let (conn, a, b) = setup();
        let c = create(&conn, &a, cycle("2024-2025")).expect("create");
        let foreign = get(&conn, &b, &c.id).expect_err("foreign");
        let missing = get(&conn, &b, "no-such-id").expect_err("missing");
        assert_eq!(foreign.code(), missing.code());
        assert_eq!(foreign.to_string(), missing.to_string());
    }

    #[test]
    fn create_under_unknown_school_fails() {
        let (conn, _, _) = setup();
        assert!(matches!(
            create(&conn, "ghost", cycle("x")),
            Err(StoreError::NotFoundOrForbidden)
        ));
    }

    #[test]
    fn inverted_range_is_rejected_on_create_and_update() {
        let (conn, a, _) = setup();
        let err = create(
            &conn,
            &a,
            NewCycle {
                name: "bad".into(),
                starts_at: T1,
                ends_at: T0,
            },
        )
        .expect_err("inverted");
        assert_eq!(err.status(), 400);

        let c = create(&conn, &a, cycle("ok")).expect("create");
        let err = update(
            &conn,
            &a,
            &c.id,
            CyclePatch {
                ends_at: Some(T0 - 1),
                ..Default::default()
            },
        )
        .expect_err("end before start");
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn soft_deleted_cycle_leaves_active_list_but_stays_readable() {
        let (conn, a, _) = setup();
        let keep = create(&conn, &a, cycle("2023-2024")).expect("keep");
        let gone = create(&conn, &a, cycle("2024-2025")).expect("gone");
        delete(&conn, &a, &gone.id).expect("delete");

        let active = list(
            &conn,
            &a,
            &ListFilter {
                active_only: true,
                ..Default::default()
            },
        )
        .expect("active");
        assert_eq!(active, vec![keep.clone()]);

        let all = list(&conn, &a, &ListFilter::default()).expect("all");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, keep.id);

        assert!(!get(&conn, &a, &gone.id).expect("by id").active);
    }

    #[test]
    fn update_checks_the_range_under_the_write_lock() {
        let dir = std::env::temp_dir().join(format!("escuelasd-cycles-{}", new_id()));
        let conn = db::open_db(&dir).expect("workspace");
        conn.busy_timeout(std::time::Duration::ZERO)
            .expect("busy timeout");
        let a = schools::create(
            &conn,
            NewSchool {
                name: "Inst A".into(),
                short_name: "A".into(),
                ..Default::default()
            },
        )
        .expect("school");
        let c = create(&conn, &a.id, cycle("2024-2025")).expect("create");

        // Another writer on the same workspace holds the write lock.
        let other = Connection::open(dir.join(db::DB_FILE)).expect("second connection");
        other.execute_batch("BEGIN IMMEDIATE").expect("lock");

        let patch = CyclePatch {
            starts_at: Some(T1 + 1),
            ..Default::default()
        };
        let err = update(&conn, &a.id, &c.id, patch.clone()).expect_err("locked");
        assert_eq!(err.code(), "internal");

        other.execute_batch("ROLLBACK").expect("unlock");
        let err = update(&conn, &a.id, &c.id, patch).expect_err("inverted");
        assert_eq!(err.code(), "bad_params");
        assert_eq!(get(&conn, &a.id, &c.id).expect("unchanged"), c);

        drop(other);
        drop(conn);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
