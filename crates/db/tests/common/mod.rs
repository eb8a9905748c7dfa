//! Shared fixtures for repository tests.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use feedo_core::feedback::{Feedback, NewFeedback, Sentiment, SourceChannel};
use feedo_db::repositories::FeedbackRepo;

pub fn owner() -> Uuid {
    Uuid::new_v4()
}

pub fn new_feedback(name: &str, rating: i16) -> NewFeedback {
    NewFeedback {
        customer_name: name.to_string(),
        customer_email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        customer_phone: None,
        rating,
        comment: format!("Comentário de {name}"),
        source: SourceChannel::Website,
        location: None,
        category: None,
        nps_score: None,
        tags: Vec::new(),
    }
}

/// Create a record the way the mutation layer does: sentiment derived from
/// the rating.
pub async fn create(pool: &PgPool, owner: Uuid, name: &str, rating: i16) -> Feedback {
    FeedbackRepo::create_with_tags(
        pool,
        owner,
        &new_feedback(name, rating),
        Sentiment::for_rating(rating),
    )
    .await
    .unwrap()
}

/// Rewrite a record's creation time. Repos always stamp `NOW()`, so tests
/// that need a spread of creation times adjust rows after insert.
pub async fn backdate(pool: &PgPool, id: Uuid, created_at: DateTime<Utc>) {
    sqlx::query("UPDATE feedbacks SET created_at = $1, updated_at = $1 WHERE id = $2")
        .bind(created_at)
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
}
