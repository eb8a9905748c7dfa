//! Postgres-backed [`FeedbackStore`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use feedo_core::error::FeedoError;
use feedo_core::feedback::{
    Feedback, FeedbackChanges, FeedbackPage, FeedbackResponse, NewFeedback, ResponseTemplate,
    Sentiment,
};
use feedo_core::query::QueryDescription;
use feedo_core::stats::FeedbackStats;
use feedo_core::types::RecordId;
use feedo_db::repositories::{FeedbackRepo, StatsRepo, TemplateRepo};
use feedo_db::DbError;
use feedo_events::{EventBus, EventFilter, RecordEvent};

use crate::store::FeedbackStore;
use crate::subscription::RecordSubscription;

/// [`FeedbackStore`] over a Postgres pool.
///
/// Owner scoping is enforced with explicit predicates in every statement,
/// and a [`RecordEvent`] is published on the shared bus after each
/// successful mutation. Zero-row mutations are classified into `NotFound`
/// or `PermissionDenied` by probing who owns the record.
pub struct PgFeedbackStore {
    pool: PgPool,
    bus: Arc<EventBus>,
}

impl PgFeedbackStore {
    pub fn new(pool: PgPool, bus: Arc<EventBus>) -> Self {
        Self { pool, bus }
    }

    /// The bus mutations publish on. Exposed so hosts can hang additional
    /// consumers off the same channel.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Decide whether a zero-row mutation hit a missing record or another
    /// account's record.
    async fn classify_miss(&self, owner: RecordId, id: RecordId) -> FeedoError {
        match FeedbackRepo::owner_of(&self.pool, id).await {
            Ok(Some(actual)) if actual != owner => FeedoError::PermissionDenied {
                entity: "feedback",
                id,
            },
            Ok(_) => FeedoError::NotFound {
                entity: "feedback",
                id,
            },
            Err(e) => transport(e),
        }
    }
}

fn transport(e: DbError) -> FeedoError {
    FeedoError::Transport(e.to_string())
}

#[async_trait]
impl FeedbackStore for PgFeedbackStore {
    async fn query_feedbacks(
        &self,
        owner: RecordId,
        query: &QueryDescription,
    ) -> Result<FeedbackPage, FeedoError> {
        FeedbackRepo::page(&self.pool, owner, query)
            .await
            .map_err(transport)
    }

    async fn fetch_stats(&self, owner: RecordId) -> Result<Option<FeedbackStats>, FeedoError> {
        StatsRepo::summary_for_owner(&self.pool, owner, Utc::now())
            .await
            .map_err(transport)
    }

    async fn list_templates(&self, owner: RecordId) -> Result<Vec<ResponseTemplate>, FeedoError> {
        TemplateRepo::list_for_owner(&self.pool, owner)
            .await
            .map_err(transport)
    }

    async fn create_feedback(
        &self,
        owner: RecordId,
        input: &NewFeedback,
    ) -> Result<Feedback, FeedoError> {
        let sentiment = Sentiment::for_rating(input.rating);
        let record = FeedbackRepo::create_with_tags(&self.pool, owner, input, sentiment)
            .await
            .map_err(transport)?;
        self.bus.publish(RecordEvent::inserted(record.clone()));
        Ok(record)
    }

    async fn update_feedback(
        &self,
        owner: RecordId,
        id: RecordId,
        changes: &FeedbackChanges,
    ) -> Result<Feedback, FeedoError> {
        if let Some(next) = changes.status {
            match FeedbackRepo::find_by_id(&self.pool, owner, id)
                .await
                .map_err(transport)?
            {
                Some(current) if !current.status.can_transition(next) => {
                    return Err(FeedoError::Validation(format!(
                        "cannot transition feedback from {} to {}",
                        current.status.as_str(),
                        next.as_str()
                    )));
                }
                Some(_) => {}
                None => return Err(self.classify_miss(owner, id).await),
            }
        }

        match FeedbackRepo::update(&self.pool, owner, id, changes)
            .await
            .map_err(transport)?
        {
            Some(record) => {
                self.bus.publish(RecordEvent::updated(record.clone()));
                Ok(record)
            }
            None => Err(self.classify_miss(owner, id).await),
        }
    }

    async fn delete_feedback(&self, owner: RecordId, id: RecordId) -> Result<(), FeedoError> {
        if FeedbackRepo::delete(&self.pool, owner, id)
            .await
            .map_err(transport)?
        {
            self.bus.publish(RecordEvent::deleted(owner, id));
            Ok(())
        } else {
            Err(self.classify_miss(owner, id).await)
        }
    }

    async fn insert_response(
        &self,
        owner: RecordId,
        feedback_id: RecordId,
        text: &str,
        template: Option<&str>,
    ) -> Result<FeedbackResponse, FeedoError> {
        match FeedbackRepo::insert_response(&self.pool, owner, feedback_id, text, template)
            .await
            .map_err(transport)?
        {
            Some(response) => Ok(response),
            None => Err(self.classify_miss(owner, feedback_id).await),
        }
    }

    async fn delete_response(
        &self,
        owner: RecordId,
        response_id: RecordId,
    ) -> Result<(), FeedoError> {
        if FeedbackRepo::delete_response(&self.pool, owner, response_id)
            .await
            .map_err(transport)?
        {
            Ok(())
        } else {
            Err(FeedoError::NotFound {
                entity: "response",
                id: response_id,
            })
        }
    }

    fn subscribe(&self, filter: EventFilter) -> RecordSubscription {
        RecordSubscription::new(&self.bus, filter)
    }
}
