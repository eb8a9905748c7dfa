//! Row models and their conversion into typed domain records.
//!
//! Each submodule contains:
//! - A `FromRow` struct matching the database row, with enum-ish columns
//!   kept as `String`
//! - An `into_record` conversion that validates those columns into the
//!   typed enums from `feedo_core`, failing with `DbError::Decode`

pub mod feedback;
pub mod template;
