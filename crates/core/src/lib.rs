//! Feedo domain core.
//!
//! Pure, storage-agnostic building blocks for the feedback collection and
//! triage platform:
//!
//! - [`feedback`] — typed records, status/sentiment/source enumerations,
//!   transition rules, and mutation payload validation.
//! - [`filter`] — the feedback list filter model with lenient parsing.
//! - [`query`] — turns a filter set into a backend-agnostic
//!   [`query::QueryDescription`].
//! - [`stats`] — summary numbers and the local aggregation fallback.
//! - [`export`] — CSV serialization for feedback exports.
//! - [`error`] — the [`error::FeedoError`] taxonomy shared by all layers.
//!
//! This crate has no I/O and no internal dependencies, so both the storage
//! layer and any embedding host can depend on it freely.

pub mod error;
pub mod export;
pub mod feedback;
pub mod filter;
pub mod query;
pub mod stats;
pub mod types;
