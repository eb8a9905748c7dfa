//! Data-access and session contracts.
//!
//! [`FeedbackStore`] is the boundary between the coordination layer and
//! whatever backend holds the records. The workspace ships a Postgres
//! implementation ([`PgFeedbackStore`](crate::pg::PgFeedbackStore)); tests
//! substitute an in-memory one. [`SessionSource`] is the matching seam for
//! the sign-in state.

use async_trait::async_trait;
use tokio::sync::watch;

use feedo_core::error::FeedoError;
use feedo_core::feedback::{
    Feedback, FeedbackChanges, FeedbackPage, FeedbackResponse, NewFeedback, ResponseTemplate,
};
use feedo_core::query::QueryDescription;
use feedo_core::stats::FeedbackStats;
use feedo_core::types::RecordId;
use feedo_events::EventFilter;

use crate::session::Session;
use crate::subscription::RecordSubscription;

/// Typed access to the feedback backend.
///
/// Every operation is owner-scoped: `owner` is the authenticated account
/// and implementations must never return or touch another account's rows.
/// Acting on someone else's record fails with
/// [`FeedoError::PermissionDenied`], which callers must keep distinct from
/// [`FeedoError::NotFound`].
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Run a listing query: one page of records plus the total match count
    /// across all pages.
    async fn query_feedbacks(
        &self,
        owner: RecordId,
        query: &QueryDescription,
    ) -> Result<FeedbackPage, FeedoError>;

    /// Precomputed stats summary. `Ok(None)` means the backend has none
    /// and the caller should aggregate locally.
    async fn fetch_stats(&self, owner: RecordId) -> Result<Option<FeedbackStats>, FeedoError>;

    /// The owner's response templates plus the built-in defaults.
    async fn list_templates(&self, owner: RecordId) -> Result<Vec<ResponseTemplate>, FeedoError>;

    /// Composite insert: the record and its tags as one unit. Sentiment is
    /// derived from the rating; new records start `pending` and not urgent.
    async fn create_feedback(
        &self,
        owner: RecordId,
        input: &NewFeedback,
    ) -> Result<Feedback, FeedoError>;

    /// Partial update; `None` fields keep their current value. Status
    /// changes that violate the transition rule fail with `Validation`.
    async fn update_feedback(
        &self,
        owner: RecordId,
        id: RecordId,
        changes: &FeedbackChanges,
    ) -> Result<Feedback, FeedoError>;

    async fn delete_feedback(&self, owner: RecordId, id: RecordId) -> Result<(), FeedoError>;

    /// Append a response to one of the owner's records.
    async fn insert_response(
        &self,
        owner: RecordId,
        feedback_id: RecordId,
        text: &str,
        template: Option<&str>,
    ) -> Result<FeedbackResponse, FeedoError>;

    /// Remove one response row. Compensation hook for
    /// [`respond_to`](crate::mutations::FeedbackMutations::respond_to).
    async fn delete_response(&self, owner: RecordId, response_id: RecordId)
        -> Result<(), FeedoError>;

    /// Subscribe to record change events. Dropping the subscription
    /// unsubscribes.
    fn subscribe(&self, filter: EventFilter) -> RecordSubscription;
}

/// Where the current sign-in comes from.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// The session as of now, if any.
    async fn current_session(&self) -> Result<Option<Session>, FeedoError>;

    /// Change notifications; the receiver yields the full new value.
    fn changes(&self) -> watch::Receiver<Option<Session>>;

    async fn sign_out(&self) -> Result<(), FeedoError>;
}
