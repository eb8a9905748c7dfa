//! Pure construction of feedback queries from a filter set.
//!
//! [`build_query`] turns a [`FeedbackFilters`] value into a backend-agnostic
//! [`QueryDescription`]: a list of predicates, an ordering, and a page
//! window. No SQL or I/O here; the repository layer renders the description
//! against its own schema.

use chrono::{Duration, Local, Months, NaiveTime, TimeZone, Utc};

use crate::feedback::{FeedbackStatus, Sentiment};
use crate::filter::{FeedbackFilters, Period, SortBy};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Query description
// ---------------------------------------------------------------------------

/// A single filter constraint. All predicates combine with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-insensitive substring match on customer name or comment.
    /// Carries the raw term; backends apply their own wildcard escaping.
    Search(String),
    RatingEq(i16),
    StatusEq(FeedbackStatus),
    SentimentEq(Sentiment),
    /// Creation time at or after the given instant.
    CreatedSince(Timestamp),
}

/// Sortable columns of a feedback listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKey {
    CreatedAt,
    Rating,
    Urgency,
}

/// One ordering term; earlier terms take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSpec {
    pub key: OrderKey,
    pub descending: bool,
}

/// Offset/limit window of a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: i64,
}

/// Backend-agnostic description of a feedback query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescription {
    pub predicates: Vec<Predicate>,
    pub order: Vec<OrderSpec>,
    /// `None` means the query is unpaginated (export, stats fallback).
    pub pagination: Option<PageWindow>,
}

impl QueryDescription {
    /// An unconstrained, unpaginated, newest-first query over an owner's
    /// records. Used by the stats fallback path.
    pub fn unfiltered() -> Self {
        Self {
            predicates: Vec::new(),
            order: order_for(SortBy::Newest),
            pagination: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Build the listing query for a filter set.
///
/// `now` anchors the period window and is deliberately a parameter: the
/// bound moves with every call, so two fetches of the same filters at
/// different instants cover slightly different windows.
pub fn build_query(filters: &FeedbackFilters, now: Timestamp) -> QueryDescription {
    let mut predicates = filter_predicates(filters);
    if let Some(bound) = period_lower_bound(filters.period, now) {
        predicates.push(Predicate::CreatedSince(bound));
    }

    let limit = i64::from(filters.limit.max(1));
    let page = i64::from(filters.page.max(1));

    QueryDescription {
        predicates,
        order: order_for(filters.sort),
        pagination: Some(PageWindow {
            offset: (page - 1) * limit,
            limit,
        }),
    }
}

/// Build the CSV-export query for a filter set.
///
/// Export keeps the search/rating/status/sentiment constraints but applies
/// no period window, no pagination, and always orders newest-first.
pub fn build_export_query(filters: &FeedbackFilters) -> QueryDescription {
    QueryDescription {
        predicates: filter_predicates(filters),
        order: order_for(SortBy::Newest),
        pagination: None,
    }
}

/// The predicates shared by listing and export queries.
fn filter_predicates(filters: &FeedbackFilters) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    if let Some(term) = filters.search.as_deref().map(str::trim) {
        if !term.is_empty() {
            predicates.push(Predicate::Search(term.to_string()));
        }
    }
    if let Some(rating) = filters.rating.filter(|r| (1..=5).contains(r)) {
        predicates.push(Predicate::RatingEq(rating));
    }
    if let Some(status) = filters.status.as_status() {
        predicates.push(Predicate::StatusEq(status));
    }
    if let Some(sentiment) = filters.sentiment.as_sentiment() {
        predicates.push(Predicate::SentimentEq(sentiment));
    }

    predicates
}

/// Lower creation-time bound for a period, or `None` for no window.
///
/// `Today` starts at local midnight (system timezone) of the anchor day;
/// `Week` is a rolling 7 days; `Month` goes back one calendar month with
/// day-of-month clamping.
pub fn period_lower_bound(period: Period, now: Timestamp) -> Option<Timestamp> {
    match period {
        Period::All => None,
        Period::Today => {
            let midnight = now.with_timezone(&Local).date_naive().and_time(NaiveTime::MIN);
            let anchored = Local
                .from_local_datetime(&midnight)
                .earliest()
                .map(|local| local.with_timezone(&Utc))
                // Midnight fell into a DST gap; the UTC reading is close enough.
                .unwrap_or_else(|| Utc.from_utc_datetime(&midnight));
            Some(anchored)
        }
        Period::Week => Some(now - Duration::days(7)),
        Period::Month => Some(
            now.checked_sub_months(Months::new(1))
                .unwrap_or_else(|| now - Duration::days(30)),
        ),
    }
}

fn order_for(sort: SortBy) -> Vec<OrderSpec> {
    match sort {
        SortBy::Newest => vec![OrderSpec {
            key: OrderKey::CreatedAt,
            descending: true,
        }],
        SortBy::Oldest => vec![OrderSpec {
            key: OrderKey::CreatedAt,
            descending: false,
        }],
        SortBy::RatingHigh => vec![OrderSpec {
            key: OrderKey::Rating,
            descending: true,
        }],
        SortBy::RatingLow => vec![OrderSpec {
            key: OrderKey::Rating,
            descending: false,
        }],
        SortBy::Urgent => vec![
            OrderSpec {
                key: OrderKey::Urgency,
                descending: true,
            },
            OrderSpec {
                key: OrderKey::CreatedAt,
                descending: true,
            },
        ],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
