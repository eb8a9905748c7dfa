//! The feedback list filter model.
//!
//! Filters arrive from loosely-typed surfaces (query strings, UI state), so
//! every `parse` constructor here is lenient: unrecognized input maps to the
//! no-constraint value instead of failing. Turning a filter set into an
//! executable query is the job of [`crate::query::build_query`].

use serde::{Deserialize, Serialize};

use crate::feedback::{FeedbackStatus, Sentiment};

/// Default page size for feedback listings.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

// ---------------------------------------------------------------------------
// Filter dimensions
// ---------------------------------------------------------------------------

/// Status filter; `All` applies no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Responded,
    Archived,
}

impl StatusFilter {
    /// Lenient parse: unrecognized text selects `All`.
    pub fn parse(value: &str) -> Self {
        match value {
            "pending" => StatusFilter::Pending,
            "responded" => StatusFilter::Responded,
            "archived" => StatusFilter::Archived,
            _ => StatusFilter::All,
        }
    }

    /// The concrete status this filter constrains to, if any.
    pub fn as_status(self) -> Option<FeedbackStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some(FeedbackStatus::Pending),
            StatusFilter::Responded => Some(FeedbackStatus::Responded),
            StatusFilter::Archived => Some(FeedbackStatus::Archived),
        }
    }
}

/// Sentiment filter; `All` applies no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentFilter {
    #[default]
    All,
    Positive,
    Neutral,
    Negative,
}

impl SentimentFilter {
    pub fn parse(value: &str) -> Self {
        match value {
            "positive" => SentimentFilter::Positive,
            "neutral" => SentimentFilter::Neutral,
            "negative" => SentimentFilter::Negative,
            _ => SentimentFilter::All,
        }
    }

    pub fn as_sentiment(self) -> Option<Sentiment> {
        match self {
            SentimentFilter::All => None,
            SentimentFilter::Positive => Some(Sentiment::Positive),
            SentimentFilter::Neutral => Some(Sentiment::Neutral),
            SentimentFilter::Negative => Some(Sentiment::Negative),
        }
    }
}

/// Creation-time window, anchored at query build time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    All,
    Today,
    Week,
    Month,
}

impl Period {
    pub fn parse(value: &str) -> Self {
        match value {
            "today" => Period::Today,
            "week" => Period::Week,
            "month" => Period::Month,
            _ => Period::All,
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Newest,
    Oldest,
    RatingHigh,
    RatingLow,
    /// Urgent records first, newest first within each group.
    Urgent,
}

impl SortBy {
    pub fn parse(value: &str) -> Self {
        match value {
            "oldest" => SortBy::Oldest,
            "rating_high" => SortBy::RatingHigh,
            "rating_low" => SortBy::RatingLow,
            "urgent" => SortBy::Urgent,
            _ => SortBy::Newest,
        }
    }
}

// ---------------------------------------------------------------------------
// FeedbackFilters
// ---------------------------------------------------------------------------

/// The complete filter state of a feedback listing.
///
/// Compared by value: two filter sets that are `==` describe the same query
/// and a fetch coordinator must not refetch when handed an equal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackFilters {
    /// Case-insensitive substring match on customer name or comment.
    #[serde(default)]
    pub search: Option<String>,
    /// Exact star-rating match, 1-5.
    #[serde(default)]
    pub rating: Option<i16>,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub sentiment: SentimentFilter,
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub sort: SortBy,
    /// 1-indexed page number.
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl Default for FeedbackFilters {
    fn default() -> Self {
        Self {
            search: None,
            rating: None,
            status: StatusFilter::All,
            sentiment: SentimentFilter::All,
            period: Period::All,
            sort: SortBy::Newest,
            page: default_page(),
            limit: default_limit(),
        }
    }
}

/// Lenient rating parse for loose input: anything that is not an integer
/// in 1-5 yields `None` (no constraint).
pub fn parse_rating(value: &str) -> Option<i16> {
    value.trim().parse::<i16>().ok().filter(|r| (1..=5).contains(r))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- lenient parsing -----------------------------------------------------

    #[test]
    fn status_filter_parses_known_values() {
        assert_eq!(StatusFilter::parse("pending"), StatusFilter::Pending);
        assert_eq!(StatusFilter::parse("responded"), StatusFilter::Responded);
        assert_eq!(StatusFilter::parse("archived"), StatusFilter::Archived);
    }

    #[test]
    fn unknown_status_text_selects_all() {
        assert_eq!(StatusFilter::parse("deleted"), StatusFilter::All);
        assert_eq!(StatusFilter::parse(""), StatusFilter::All);
        assert_eq!(StatusFilter::parse("PENDING"), StatusFilter::All);
    }

    #[test]
    fn unknown_sentiment_text_selects_all() {
        assert_eq!(SentimentFilter::parse("angry"), SentimentFilter::All);
        assert_eq!(SentimentFilter::parse("positive"), SentimentFilter::Positive);
    }

    #[test]
    fn unknown_period_text_selects_all() {
        assert_eq!(Period::parse("year"), Period::All);
        assert_eq!(Period::parse("week"), Period::Week);
    }

    #[test]
    fn unknown_sort_text_selects_newest() {
        assert_eq!(SortBy::parse("relevance"), SortBy::Newest);
        assert_eq!(SortBy::parse("urgent"), SortBy::Urgent);
    }

    #[test]
    fn rating_parse_drops_out_of_range_values() {
        assert_eq!(parse_rating("3"), Some(3));
        assert_eq!(parse_rating(" 5 "), Some(5));
        assert_eq!(parse_rating("0"), None);
        assert_eq!(parse_rating("6"), None);
        assert_eq!(parse_rating("-1"), None);
        assert_eq!(parse_rating("five"), None);
        assert_eq!(parse_rating(""), None);
    }

    // -- defaults and equality -----------------------------------------------

    #[test]
    fn default_filters() {
        let filters = FeedbackFilters::default();
        assert_eq!(filters.page, 1);
        assert_eq!(filters.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(filters.status, StatusFilter::All);
        assert_eq!(filters.sentiment, SentimentFilter::All);
        assert_eq!(filters.period, Period::All);
        assert_eq!(filters.sort, SortBy::Newest);
        assert!(filters.search.is_none());
        assert!(filters.rating.is_none());
    }

    #[test]
    fn filters_compare_by_value() {
        let a = FeedbackFilters {
            search: Some("wifi".to_string()),
            status: StatusFilter::Pending,
            ..Default::default()
        };
        let b = a.clone();
        assert_eq!(a, b);

        let c = FeedbackFilters {
            page: 2,
            ..a.clone()
        };
        assert_ne!(a, c);
    }

    #[test]
    fn filters_deserialize_with_defaults() {
        let filters: FeedbackFilters = serde_json::from_str("{}").unwrap();
        assert_eq!(filters, FeedbackFilters::default());

        let filters: FeedbackFilters =
            serde_json::from_str(r#"{"status":"pending","sort":"rating_low","page":3}"#).unwrap();
        assert_eq!(filters.status, StatusFilter::Pending);
        assert_eq!(filters.sort, SortBy::RatingLow);
        assert_eq!(filters.page, 3);
        assert_eq!(filters.limit, DEFAULT_PAGE_LIMIT);
    }
}
