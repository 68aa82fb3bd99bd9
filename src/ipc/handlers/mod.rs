pub mod calendar;
pub mod core;
pub mod cycles;
pub mod groups;
pub mod prospects;
pub mod school_events;
pub mod schools;
pub mod subjects;
