//! Consumer-facing layer of the feedback data core.
//!
//! Hosts embed this crate to drive a feedback inbox:
//!
//! - [`FeedbackStore`] / [`SessionSource`] — the typed contracts to the
//!   backend; [`PgFeedbackStore`] is the shipped Postgres implementation.
//! - [`FeedbackFeed`] — listing fetches with last-issued-wins
//!   reconciliation.
//! - [`StatsView`] — the aggregate numbers, with a local fallback.
//! - [`FeedbackMutations`] — create/update/delete/respond/archive.
//! - [`SessionManager`] — process-wide sign-in state.
//! - [`RecordSubscription`] / [`FeedbackListener`] — realtime record
//!   events.
//! - [`CsvExporter`] — CSV downloads of the filtered listing.

pub mod export;
pub mod feed;
pub mod mutations;
pub mod pg;
pub mod session;
pub mod stats;
pub mod store;
pub mod subscription;

pub use export::{CsvExport, CsvExporter};
pub use feed::{FeedSnapshot, FeedbackFeed};
pub use mutations::FeedbackMutations;
pub use pg::PgFeedbackStore;
pub use session::{LocalSessionSource, Session, SessionManager};
pub use stats::{StatsSnapshot, StatsView};
pub use store::{FeedbackStore, SessionSource};
pub use subscription::{FeedbackListener, RecordSubscription};
