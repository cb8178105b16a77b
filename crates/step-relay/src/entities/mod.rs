//! SeaORM entity definitions

pub mod accounts;
pub mod operational_events;
pub mod prelude;
pub mod submission_attempts;
