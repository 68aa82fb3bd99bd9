//! Ownership-checked accessors shared by every tenant-scoped record kind.
//!
//! Each accessor fetches the row by id first and compares the stored owning
//! school against the caller's school. A missing row and a row owned by another
//! school produce the same `NotFoundOrForbidden`.

use crate::store::error::{StoreError, StoreResult};
use crate::store::kind::{DeletePolicy, EntityKind};
use rusqlite::types::Value;
use rusqlite::{
    params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use uuid::Uuid;

pub trait TenantRecord: Sized {
    const KIND: EntityKind;
    /// Select list in the order `from_row` reads it.
    const COLUMNS: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
    fn owner_id(&self) -> &str;
}

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub active_only: bool,
    /// Parent id for kinds with a secondary key (the cycle of a calendar event).
    pub parent_id: Option<String>,
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Opens a transaction that takes the write lock up front, so a read-check-write
/// sequence cannot interleave with another writer on the same workspace.
pub fn immediate(conn: &Connection) -> rusqlite::Result<Transaction<'_>> {
    Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
}

fn fetch<T: TenantRecord>(conn: &Connection, id: &str) -> StoreResult<Option<T>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = ?",
        T::COLUMNS,
        T::KIND.table()
    );
    Ok(conn.query_row(&sql, [id], T::from_row).optional()?)
}

pub fn get<T: TenantRecord>(conn: &Connection, school_id: &str, id: &str) -> StoreResult<T> {
    match fetch::<T>(conn, id)? {
        Some(rec) if rec.owner_id() == school_id => Ok(rec),
        Some(_) => {
            tracing::debug!(kind = T::KIND.label(), id, "ownership mismatch");
            Err(StoreError::NotFoundOrForbidden)
        }
        None => Err(StoreError::NotFoundOrForbidden),
    }
}

pub fn list<T: TenantRecord>(
    conn: &Connection,
    school_id: &str,
    filter: &ListFilter,
) -> StoreResult<Vec<T>> {
    let kind = T::KIND;
    let Some(owner) = kind.owner_column() else {
        return Err(StoreError::Internal(anyhow::anyhow!(
            "{} has no owning school",
            kind.label()
        )));
    };

    let mut where_parts = vec![format!("{owner} = ?")];
    let mut binds = vec![Value::Text(school_id.to_string())];
    if filter.active_only {
        if let Some(col) = kind.active_column() {
            where_parts.push(format!("{col} = 1"));
        }
    }
    if let Some(parent_id) = &filter.parent_id {
        let Some(col) = kind.secondary_column() else {
            return Err(StoreError::validation(format!(
                "{} lists cannot be filtered by parent",
                kind.label()
            )));
        };
        where_parts.push(format!("{col} = ?"));
        binds.push(Value::Text(parent_id.clone()));
    }

    // rowid order is insertion order.
    let sql = format!(
        "SELECT {} FROM {} WHERE {} ORDER BY rowid",
        T::COLUMNS,
        kind.table(),
        where_parts.join(" AND ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(binds.iter()), T::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn insert(
    conn: &Connection,
    kind: EntityKind,
    fields: &[(&str, Value)],
) -> rusqlite::Result<()> {
    let columns = fields
        .iter()
        .map(|(c, _)| *c)
        .collect::<Vec<_>>()
        .join(", ");
    let marks = vec!["?"; fields.len()].join(", ");
    let sql = format!("INSERT INTO {}({columns}) VALUES({marks})", kind.table());
    conn.execute(&sql, params_from_iter(fields.iter().map(|(_, v)| v)))?;
    Ok(())
}

pub fn delete_row(conn: &Connection, kind: EntityKind, id: &str) -> rusqlite::Result<usize> {
    conn.execute(&format!("DELETE FROM {} WHERE id = ?", kind.table()), [id])
}

/// Applies `changes` to a record owned by `school_id` and returns the stored
/// result. Columns not named in `changes` are left untouched.
pub fn update<T: TenantRecord>(
    conn: &Connection,
    school_id: &str,
    id: &str,
    changes: Vec<(&'static str, Value)>,
) -> StoreResult<T> {
    let tx = immediate(conn)?;
    get::<T>(&tx, school_id, id)?;
    let updated = apply_update::<T>(&tx, school_id, id, changes)?;
    tx.commit()?;
    Ok(updated)
}

/// The UPDATE half of [`update`], for callers that already hold a transaction
/// and have checked ownership themselves.
pub fn apply_update<T: TenantRecord>(
    conn: &Connection,
    school_id: &str,
    id: &str,
    changes: Vec<(&'static str, Value)>,
) -> StoreResult<T> {
    if changes.is_empty() {
        return Err(StoreError::validation(
            "patch must change at least one field",
        ));
    }

    let set_parts = changes
        .iter()
        .map(|(c, _)| format!("{c} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut binds: Vec<Value> = changes.into_iter().map(|(_, v)| v).collect();
    binds.push(Value::Text(id.to_string()));

    let sql = format!("UPDATE {} SET {set_parts} WHERE id = ?", T::KIND.table());
    conn.execute(&sql, params_from_iter(binds.iter()))?;
    get::<T>(conn, school_id, id)
}

/// Deletes a record according to its kind's delete policy and returns it as it
/// looks afterwards (soft) or as it was (hard).
pub fn remove<T: TenantRecord>(conn: &Connection, school_id: &str, id: &str) -> StoreResult<T> {
    let tx = immediate(conn)?;
    let existing = get::<T>(&tx, school_id, id)?;
    let kind = T::KIND;
    let removed = match kind.delete_policy() {
        DeletePolicy::Soft => {
            let Some(col) = kind.active_column() else {
                return Err(StoreError::Internal(anyhow::anyhow!(
                    "{} has no active flag",
                    kind.label()
                )));
            };
            tx.execute(
                &format!("UPDATE {} SET {col} = 0 WHERE id = ?", kind.table()),
                [id],
            )?;
            get::<T>(&tx, school_id, id)?
        }
        DeletePolicy::Hard => {
            delete_row(&tx, kind, id)?;
            existing
        }
    };
    tx.commit()?;
    Ok(removed)
}
