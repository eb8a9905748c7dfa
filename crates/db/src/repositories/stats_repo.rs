//! Aggregate summary queries over the `feedbacks` table.

use chrono::Duration;
use sqlx::PgPool;

use feedo_core::stats::FeedbackStats;
use feedo_core::types::{RecordId, Timestamp};

use crate::error::DbError;

/// One row of the summary aggregate. Averages are cast to FLOAT8 in SQL so
/// they decode without a decimal crate.
#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    total_feedbacks: i64,
    pending_count: i64,
    responded_count: i64,
    urgent_count: i64,
    average_rating: f64,
    average_nps: f64,
    positive_count: i64,
    neutral_count: i64,
    negative_count: i64,
    last_7_days: i64,
    last_30_days: i64,
}

/// Precomputed statistics over an owner's feedback inbox.
pub struct StatsRepo;

impl StatsRepo {
    /// Aggregate an owner's records in one pass.
    ///
    /// Returns `None` when the owner has no records at all; callers fall
    /// back to local aggregation (which yields the all-zero default).
    pub async fn summary_for_owner(
        pool: &PgPool,
        owner: RecordId,
        now: Timestamp,
    ) -> Result<Option<FeedbackStats>, DbError> {
        let week_bound = now - Duration::days(7);
        let month_bound = now - Duration::days(30);

        let row: SummaryRow = sqlx::query_as(
            "SELECT \
                 COUNT(*) AS total_feedbacks, \
                 COUNT(*) FILTER (WHERE status = 'pending') AS pending_count, \
                 COUNT(*) FILTER (WHERE status = 'responded') AS responded_count, \
                 COUNT(*) FILTER (WHERE is_urgent) AS urgent_count, \
                 COALESCE(AVG(rating), 0)::FLOAT8 AS average_rating, \
                 COALESCE(AVG(nps_score), 0)::FLOAT8 AS average_nps, \
                 COUNT(*) FILTER (WHERE sentiment = 'positive') AS positive_count, \
                 COUNT(*) FILTER (WHERE sentiment = 'neutral') AS neutral_count, \
                 COUNT(*) FILTER (WHERE sentiment = 'negative') AS negative_count, \
                 COUNT(*) FILTER (WHERE created_at >= $2) AS last_7_days, \
                 COUNT(*) FILTER (WHERE created_at >= $3) AS last_30_days \
             FROM feedbacks \
             WHERE owner_id = $1",
        )
        .bind(owner)
        .bind(week_bound)
        .bind(month_bound)
        .fetch_one(pool)
        .await?;

        if row.total_feedbacks == 0 {
            return Ok(None);
        }

        let response_rate = row.responded_count as f64 / row.total_feedbacks as f64 * 100.0;
        Ok(Some(FeedbackStats {
            total_feedbacks: row.total_feedbacks,
            pending_count: row.pending_count,
            responded_count: row.responded_count,
            urgent_count: row.urgent_count,
            average_rating: row.average_rating,
            average_nps: row.average_nps,
            response_rate,
            positive_count: row.positive_count,
            neutral_count: row.neutral_count,
            negative_count: row.negative_count,
            last_7_days: row.last_7_days,
            last_30_days: row.last_30_days,
        }))
    }
}
