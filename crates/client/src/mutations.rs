//! Mutation operations over the feedback inbox.

use std::sync::Arc;

use validator::Validate;

use feedo_core::error::FeedoError;
use feedo_core::feedback::{
    Feedback, FeedbackChanges, FeedbackResponse, FeedbackStatus, NewFeedback,
};
use feedo_core::types::RecordId;

use crate::store::FeedbackStore;

/// Store-backed mutations. Thin by design: validation and composition
/// happen here, persistence in the store.
pub struct FeedbackMutations {
    store: Arc<dyn FeedbackStore>,
}

impl FeedbackMutations {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }

    /// Validate and insert a new record with its tags. Sentiment is derived
    /// from the rating; the record starts `pending`.
    pub async fn create(&self, owner: RecordId, input: NewFeedback) -> Result<Feedback, FeedoError> {
        input.validate()?;
        self.store.create_feedback(owner, &input).await
    }

    /// Apply a partial update. Status changes must follow the transition
    /// rule; an empty changeset is rejected.
    pub async fn update(
        &self,
        owner: RecordId,
        id: RecordId,
        changes: FeedbackChanges,
    ) -> Result<Feedback, FeedoError> {
        if changes.is_empty() {
            return Err(FeedoError::Validation("no fields to update".to_string()));
        }
        changes.validate()?;
        self.store.update_feedback(owner, id, &changes).await
    }

    /// Delete a record. A second delete of the same id reports `NotFound`.
    pub async fn delete(&self, owner: RecordId, id: RecordId) -> Result<(), FeedoError> {
        self.store.delete_feedback(owner, id).await
    }

    /// Respond to a record: insert the response, then transition the
    /// parent to `responded`.
    ///
    /// The two steps are not atomic. When the transition fails the inserted
    /// response is deleted again; if that compensation also fails the
    /// caller receives [`FeedoError::PartialFailure`] naming the orphan.
    pub async fn respond_to(
        &self,
        owner: RecordId,
        feedback_id: RecordId,
        text: &str,
        template: Option<&str>,
    ) -> Result<FeedbackResponse, FeedoError> {
        if text.trim().is_empty() {
            return Err(FeedoError::Validation(
                "response text is required".to_string(),
            ));
        }

        let response = self
            .store
            .insert_response(owner, feedback_id, text, template)
            .await?;

        let transition = self
            .store
            .update_feedback(
                owner,
                feedback_id,
                &FeedbackChanges::status_only(FeedbackStatus::Responded),
            )
            .await;

        match transition {
            Ok(_) => Ok(response),
            Err(update_err) => {
                tracing::warn!(
                    feedback_id = %feedback_id,
                    error = %update_err,
                    "Response saved but status transition failed, compensating"
                );
                match self.store.delete_response(owner, response.id).await {
                    Ok(()) => Err(update_err),
                    Err(comp_err) => {
                        tracing::error!(
                            feedback_id = %feedback_id,
                            response_id = %response.id,
                            error = %comp_err,
                            "Compensation failed, orphan response left behind"
                        );
                        Err(FeedoError::PartialFailure(format!(
                            "response {} saved but the status update failed ({update_err}); \
                             removing the response failed too: {comp_err}",
                            response.id
                        )))
                    }
                }
            }
        }
    }

    /// Move a record to `archived`. Archiving an archived record is a
    /// same-state no-op, so calling this twice succeeds.
    pub async fn archive(&self, owner: RecordId, id: RecordId) -> Result<Feedback, FeedoError> {
        self.update(owner, id, FeedbackChanges::status_only(FeedbackStatus::Archived))
            .await
    }

    /// Flag or unflag a record as urgent.
    pub async fn mark_urgent(
        &self,
        owner: RecordId,
        id: RecordId,
        is_urgent: bool,
    ) -> Result<Feedback, FeedoError> {
        self.update(owner, id, FeedbackChanges::urgency(is_urgent))
            .await
    }
}
