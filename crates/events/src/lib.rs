//! Feedo record event plumbing.
//!
//! This crate provides the in-process change notification channel that
//! keeps live views in sync with the mutation layer:
//!
//! - [`EventBus`] — publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`RecordEvent`] — the change envelope for feedback records.
//! - [`EventFilter`] — subscriber-side predicate (per account, per kind).

pub mod bus;

pub use bus::{EventBus, EventFilter, RecordEvent, RecordEventKind};
