//! Tenant-scoped record store.
//!
//! Every record kind except schools and prospect leads carries an owning-school
//! id; reads and writes go through [`tenant`], which refuses records owned by a
//! different school.

pub mod calendar;
pub mod cycles;
pub mod error;
pub mod fields;
pub mod groups;
pub mod kind;
pub mod prospects;
pub mod school_events;
pub mod schools;
pub mod subjects;
pub mod tenant;

pub use error::{StoreError, StoreResult};
pub use tenant::ListFilter;
