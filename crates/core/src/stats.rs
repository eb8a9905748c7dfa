//! Feedback statistics and the local aggregation fallback.
//!
//! The primary stats source is a precomputed backend summary; when the
//! backend has none, callers aggregate the owner's records locally with
//! [`aggregate`]. Both paths produce the same [`FeedbackStats`] shape, and
//! an owner with no records always gets the all-zero default.

use serde::{Deserialize, Serialize};

use crate::feedback::{Feedback, FeedbackStatus, Sentiment};
use crate::types::Timestamp;

/// Summary numbers for an owner's feedback inbox.
///
/// `Default` is the all-zero summary, which is the correct value for an
/// owner with no records (never an error).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub total_feedbacks: i64,
    pub pending_count: i64,
    pub responded_count: i64,
    pub urgent_count: i64,
    /// Mean star rating over all records; 0 when there are none.
    pub average_rating: f64,
    /// Mean NPS over the records that carry a score; 0 when none do.
    pub average_nps: f64,
    /// Percentage of records in `responded` state, 0-100.
    pub response_rate: f64,
    pub positive_count: i64,
    pub neutral_count: i64,
    pub negative_count: i64,
    /// Records created in the trailing 7 days.
    pub last_7_days: i64,
    /// Records created in the trailing 30 days.
    pub last_30_days: i64,
}

/// Aggregate a slice of records into summary numbers.
///
/// `now` anchors the trailing 7/30-day windows.
pub fn aggregate(records: &[Feedback], now: Timestamp) -> FeedbackStats {
    if records.is_empty() {
        return FeedbackStats::default();
    }

    let total = records.len() as i64;
    let mut stats = FeedbackStats {
        total_feedbacks: total,
        ..Default::default()
    };

    let week_bound = now - chrono::Duration::days(7);
    let month_bound = now - chrono::Duration::days(30);

    let mut rating_sum = 0i64;
    let mut nps_sum = 0i64;
    let mut nps_count = 0i64;

    for record in records {
        match record.status {
            FeedbackStatus::Pending => stats.pending_count += 1,
            FeedbackStatus::Responded => stats.responded_count += 1,
            FeedbackStatus::Archived => {}
        }
        match record.sentiment {
            Sentiment::Positive => stats.positive_count += 1,
            Sentiment::Neutral => stats.neutral_count += 1,
            Sentiment::Negative => stats.negative_count += 1,
        }
        if record.is_urgent {
            stats.urgent_count += 1;
        }
        rating_sum += i64::from(record.rating);
        if let Some(nps) = record.nps_score {
            nps_sum += i64::from(nps);
            nps_count += 1;
        }
        if record.created_at >= week_bound {
            stats.last_7_days += 1;
        }
        if record.created_at >= month_bound {
            stats.last_30_days += 1;
        }
    }

    stats.average_rating = rating_sum as f64 / total as f64;
    if nps_count > 0 {
        stats.average_nps = nps_sum as f64 / nps_count as f64;
    }
    stats.response_rate = stats.responded_count as f64 / total as f64 * 100.0;

    stats
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
