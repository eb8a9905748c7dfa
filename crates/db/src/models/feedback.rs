//! Row models for the `feedbacks` and `feedback_responses` tables.

use sqlx::FromRow;

use feedo_core::feedback::{Feedback, FeedbackResponse, FeedbackStatus, Sentiment, SourceChannel};
use feedo_core::types::{RecordId, Timestamp};

use crate::error::DbError;

/// A row from the `feedbacks` table.
///
/// Enum-ish columns stay `String` until [`FeedbackRow::into_record`]
/// validates them; tags and responses are loaded separately and attached
/// during conversion.
#[derive(Debug, Clone, FromRow)]
pub struct FeedbackRow {
    pub id: RecordId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub rating: i16,
    pub comment: String,
    pub sentiment: String,
    pub status: String,
    pub is_urgent: bool,
    pub source: String,
    pub location: Option<String>,
    pub category: Option<String>,
    pub nps_score: Option<i16>,
    pub owner_id: RecordId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FeedbackRow {
    /// Validate the row into a typed record, attaching its tags and
    /// responses.
    pub fn into_record(
        self,
        tags: Vec<String>,
        responses: Vec<FeedbackResponse>,
    ) -> Result<Feedback, DbError> {
        let sentiment = Sentiment::parse(&self.sentiment).ok_or_else(|| DbError::Decode {
            table: "feedbacks",
            column: "sentiment",
            value: self.sentiment.clone(),
            id: self.id,
        })?;
        let status = FeedbackStatus::parse(&self.status).ok_or_else(|| DbError::Decode {
            table: "feedbacks",
            column: "status",
            value: self.status.clone(),
            id: self.id,
        })?;
        let source = SourceChannel::parse(&self.source).ok_or_else(|| DbError::Decode {
            table: "feedbacks",
            column: "source",
            value: self.source.clone(),
            id: self.id,
        })?;

        Ok(Feedback {
            id: self.id,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            rating: self.rating,
            comment: self.comment,
            sentiment,
            status,
            is_urgent: self.is_urgent,
            source,
            location: self.location,
            category: self.category,
            nps_score: self.nps_score,
            owner_id: self.owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            tags,
            responses,
        })
    }
}

/// A row from the `feedback_responses` table.
#[derive(Debug, Clone, FromRow)]
pub struct ResponseRow {
    pub id: RecordId,
    pub feedback_id: RecordId,
    pub response_text: String,
    pub template_used: Option<String>,
    pub owner_id: RecordId,
    pub created_at: Timestamp,
}

impl From<ResponseRow> for FeedbackResponse {
    fn from(row: ResponseRow) -> Self {
        FeedbackResponse {
            id: row.id,
            feedback_id: row.feedback_id,
            response_text: row.response_text,
            template_used: row.template_used,
            owner_id: row.owner_id,
            created_at: row.created_at,
        }
    }
}
