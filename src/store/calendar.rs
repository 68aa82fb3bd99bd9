use crate::store::cycles::{self, AcademicCycle};
use crate::store::error::StoreResult;
use crate::store::fields::{flag, nullable, optional_text, required_text, text_or_null};
use crate::store::kind::EntityKind;
use crate::store::schools;
use crate::store::tenant::{self, new_id, now_ms, ListFilter, TenantRecord};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_creationTime")]
    pub creation_time: i64,
    #[serde(rename = "escuelaId")]
    pub school_id: String,
    #[serde(rename = "cicloEscolarId")]
    pub cycle_id: String,
    #[serde(rename = "fecha")]
    pub date: i64,
    /// "clase", "feriado", "examen", ...
    #[serde(rename = "tipo")]
    pub category: String,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "activo")]
    pub active: bool,
}

impl TenantRecord for CalendarEvent {
    const KIND: EntityKind = EntityKind::CalendarEvent;
    const COLUMNS: &'static str =
        "id, creation_time, escuela_id, ciclo_escolar_id, fecha, tipo, descripcion, activo";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            creation_time: row.get(1)?,
            school_id: row.get(2)?,
            cycle_id: row.get(3)?,
            date: row.get(4)?,
            category: row.get(5)?,
            description: row.get(6)?,
            active: row.get(7)?,
        })
    }

    fn owner_id(&self) -> &str {
        &self.school_id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCalendarEvent {
    #[serde(rename = "cicloEscolarId")]
    pub cycle_id: String,
    #[serde(rename = "fecha")]
    pub date: i64,
    #[serde(rename = "tipo")]
    pub category: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarEventPatch {
    #[serde(rename = "fecha", default)]
    pub date: Option<i64>,
    #[serde(rename = "tipo", default)]
    pub category: Option<String>,
    #[serde(rename = "descripcion", default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(rename = "activo", default)]
    pub active: Option<bool>,
}

/// The referenced cycle must belong to the same school.
pub fn create(
    conn: &Connection,
    school_id: &str,
    input: NewCalendarEvent,
) -> StoreResult<CalendarEvent> {
    schools::get(conn, school_id)?;
    let cycle: AcademicCycle = cycles::get(conn, school_id, &input.cycle_id)?;
    let category = required_text("tipo", &input.category)?;

    let id = new_id();
    tenant::insert(
        conn,
        EntityKind::CalendarEvent,
        &[
            ("id", Value::Text(id.clone())),
            ("creation_time", Value::Integer(now_ms())),
            ("escuela_id", Value::Text(school_id.to_string())),
            ("ciclo_escolar_id", Value::Text(cycle.id)),
            ("fecha", Value::Integer(input.date)),
            ("tipo", Value::Text(category)),
            ("descripcion", text_or_null(optional_text(input.description))),
            ("activo", flag(true)),
        ],
    )?;
    get(conn, school_id, &id)
}

pub fn get(conn: &Connection, school_id: &str, id: &str) -> StoreResult<CalendarEvent> {
    tenant::get(conn, school_id, id)
}

/// `filter.parent_id` narrows the list to one academic cycle.
pub fn list(
    conn: &Connection,
    school_id: &str,
    filter: &ListFilter,
) -> StoreResult<Vec<CalendarEvent>> {
    tenant::list(conn, school_id, filter)
}

pub fn update(
    conn: &Connection,
    school_id: &str,
    id: &str,
    patch: CalendarEventPatch,
) -> StoreResult<CalendarEvent> {
    let mut changes: Vec<(&'static str, Value)> = Vec::new();
    if let Some(v) = patch.date {
        changes.push(("fecha", Value::Integer(v)));
    }
    if let Some(v) = patch.category {
        changes.push(("tipo", Value::Text(required_text("tipo", &v)?)));
    }
    if let Some(v) = patch.description {
        changes.push(("descripcion", text_or_null(optional_text(v))));
    }
    if let Some(v) = patch.active {
        changes.push(("activo", flag(v)));
    }
    tenant::update(conn, school_id, id, changes)
}

pub fn delete(conn: &Connection, school_id: &str, id: &str) -> StoreResult<CalendarEvent> {
    tenant::remove(conn, school_id, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::store::cycles::NewCycle;
    use crate::store::error::StoreError;
    use crate::store::schools::NewSchool;

    struct Fixture {
        conn: Connection,
        school: String,
        other_school: String,
        cycle: String,
        other_cycle: String,
    }

    fn setup() -> Fixture {
        let conn = Connection::open_in_memory().expect("open");
        db::init_schema(&conn).expect("schema");
        let mut ids = Vec::new();
        for name in ["Inst A", "Inst B"] {
            let s = schools::create(
                &conn,
                NewSchool {
                    name: name.into(),
                    short_name: name.into(),
                    ..Default::default()
                },
            )
            .expect("school");
            let c = cycles::create(
                &conn,
                &s.id,
                NewCycle {
                    name: "2024-2025".into(),
                    starts_at: 0,
                    ends_at: 1_000,
                },
            )
            .expect("cycle");
            ids.push((s.id, c.id));
        }
        let (other_school, other_cycle) = ids.pop().expect("b");
        let (school, cycle) = ids.pop().expect("a");
        Fixture {
            conn,
            school,
            other_school,
            cycle,
            other_cycle,
        }
    }

    fn event(cycle: &str, date: i64) -> NewCalendarEvent {
        NewCalendarEvent {
            cycle_id: cycle.into(),
            date,
            category: "feriado".into(),
            description: Some("Día de asueto".into()),
        }
    }

    #[test]
    fn soft_deleted_event_drops_out_of_active_list_only() {
        let f = setup();
        let e = create(&f.conn, &f.school, event(&f.cycle, 10)).expect("create");
        assert!(e.active);

        delete(&f.conn, &f.school, &e.id).expect("delete");

        let active = list(
            &f.conn,
            &f.school,
            &ListFilter {
                active_only: true,
                ..Default::default()
            },
        )
        .expect("active");
        assert!(active.iter().all(|x| x.id != e.id));

        let by_id = get(&f.conn, &f.school, &e.id).expect("still addressable");
        assert!(!by_id.active);
    }

    #[test]
    fn cannot_attach_event_to_another_schools_cycle() {
        let f = setup();
        assert!(matches!(
            create(&f.conn, &f.school, event(&f.other_cycle, 10)),
            Err(StoreError::NotFoundOrForbidden)
        ));
    }

    #[test]
    fn list_filters_by_cycle_and_keeps_insertion_order() {
        let f = setup();
        let second_cycle = cycles::create(
            &f.conn,
            &f.school,
            NewCycle {
                name: "2025-2026".into(),
                starts_at: 1_000,
                ends_at: 2_000,
            },
        )
        .expect("cycle 2");
        let late = create(&f.conn, &f.school, event(&f.cycle, 50)).expect("late");
        let early = create(&f.conn, &f.school, event(&f.cycle, 5)).expect("early");
        let _elsewhere = create(&f.conn, &f.school, event(&second_cycle.id, 7)).expect("other");
        let _foreign =
            create(&f.conn, &f.other_school, event(&f.other_cycle, 1)).expect("foreign");

        let rows = list(
            &f.conn,
            &f.school,
            &ListFilter {
                active_only: false,
                parent_id: Some(f.cycle.clone()),
            },
        )
        .expect("list");
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![late.id.as_str(), early.id.as_str()]);
    }

    #[test]
    fn update_clears_description_with_null() {
        let f = setup();
        let e = create(&f.conn, &f.school, event(&f.cycle, 10)).expect("create");
        let patch: CalendarEventPatch =
            serde_json::from_value(serde_json::json!({ "descripcion": null })).expect("patch");
        let updated = update(&f.conn, &f.school, &e.id, patch).expect("update");
        assert_eq!(updated.description, None);
        assert_eq!(updated.category, "feriado");
        assert_eq!(updated.date, 10);
    }

    #[test]
    fn empty_patch_is_rejected() {
        let f = setup();
        let e = create(&f.conn, &f.school, event(&f.cycle, 10)).expect("create");
        let err = update(&f.conn, &f.school, &e.id, CalendarEventPatch::default())
            .expect_err("empty patch");
        assert_eq!(err.code(), "bad_params");
    }
}
