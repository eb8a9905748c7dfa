//! Repository for the `feedbacks` table and its child tables.
//!
//! Listing queries are rendered from a backend-agnostic
//! [`QueryDescription`]; every statement carries an explicit `owner_id`
//! predicate. Tags and responses are batch-loaded per page and attached
//! during the typed conversion.

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};

use feedo_core::feedback::{Feedback, FeedbackChanges, FeedbackPage, FeedbackResponse, NewFeedback, Sentiment};
use feedo_core::query::{OrderKey, OrderSpec, Predicate, QueryDescription};
use feedo_core::types::RecordId;

use crate::error::DbError;
use crate::models::feedback::{FeedbackRow, ResponseRow};

/// Column list for `feedbacks` queries.
const COLUMNS: &str = "\
    id, customer_name, customer_email, customer_phone, rating, comment, \
    sentiment, status, is_urgent, source, location, category, nps_score, \
    owner_id, created_at, updated_at";

/// Column list for `feedback_responses` queries.
const RESPONSE_COLUMNS: &str =
    "id, feedback_id, response_text, template_used, owner_id, created_at";

/// Provides owner-scoped CRUD and listing operations for feedbacks.
pub struct FeedbackRepo;

impl FeedbackRepo {
    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    /// Execute a listing query: one page of typed records plus the total
    /// match count across all pages.
    pub async fn page(
        pool: &PgPool,
        owner: RecordId,
        query: &QueryDescription,
    ) -> Result<FeedbackPage, DbError> {
        let mut count_sql = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM feedbacks");
        push_scope(&mut count_sql, owner, &query.predicates);
        let total_count: i64 = count_sql.build_query_scalar().fetch_one(pool).await?;

        let mut rows_sql =
            QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM feedbacks"));
        push_scope(&mut rows_sql, owner, &query.predicates);
        rows_sql.push(" ORDER BY ").push(order_sql(&query.order));
        if let Some(window) = query.pagination {
            rows_sql.push(" LIMIT ").push_bind(window.limit);
            rows_sql.push(" OFFSET ").push_bind(window.offset);
        }
        let rows: Vec<FeedbackRow> = rows_sql.build_query_as().fetch_all(pool).await?;

        let records = Self::attach_children(pool, rows).await?;
        Ok(FeedbackPage {
            records,
            total_count,
        })
    }

    /// Find one of the owner's records, with tags and responses attached.
    pub async fn find_by_id(
        pool: &PgPool,
        owner: RecordId,
        id: RecordId,
    ) -> Result<Option<Feedback>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM feedbacks WHERE id = $1 AND owner_id = $2");
        let row: Option<FeedbackRow> = sqlx::query_as(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => {
                let mut records = Self::attach_children(pool, vec![row]).await?;
                Ok(records.pop())
            }
            None => Ok(None),
        }
    }

    /// Who owns a record, regardless of the caller. Used to tell "not
    /// found" apart from "someone else's record" after a zero-row mutation.
    pub async fn owner_of(pool: &PgPool, id: RecordId) -> Result<Option<RecordId>, DbError> {
        let owner = sqlx::query_scalar("SELECT owner_id FROM feedbacks WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(owner)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Insert a record and its tags as one unit.
    ///
    /// Sentiment is passed separately because it is derived, not part of
    /// the caller payload. Blank tags are skipped.
    pub async fn create_with_tags(
        pool: &PgPool,
        owner: RecordId,
        input: &NewFeedback,
        sentiment: Sentiment,
    ) -> Result<Feedback, DbError> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO feedbacks \
                 (customer_name, customer_email, customer_phone, rating, comment, \
                  sentiment, source, location, category, nps_score, owner_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        let row: FeedbackRow = sqlx::query_as(&query)
            .bind(&input.customer_name)
            .bind(&input.customer_email)
            .bind(input.customer_phone.as_deref())
            .bind(input.rating)
            .bind(&input.comment)
            .bind(sentiment.as_str())
            .bind(input.source.as_str())
            .bind(input.location.as_deref())
            .bind(input.category.as_deref())
            .bind(input.nps_score)
            .bind(owner)
            .fetch_one(&mut *tx)
            .await?;

        let mut tags: Vec<String> = Vec::with_capacity(input.tags.len());
        for tag in &input.tags {
            let tag = tag.trim();
            if tag.is_empty() {
                continue;
            }
            sqlx::query("INSERT INTO feedback_tags (feedback_id, tag) VALUES ($1, $2)")
                .bind(row.id)
                .bind(tag)
                .execute(&mut *tx)
                .await?;
            tags.push(tag.to_string());
        }

        tx.commit().await?;
        // Reads return tags in stable alphabetical order; match it here so
        // the created record equals a subsequent find.
        tags.sort();
        row.into_record(tags, Vec::new())
    }

    /// Partially update one of the owner's records; absent fields keep
    /// their current value. Returns `None` when no owned row matched.
    pub async fn update(
        pool: &PgPool,
        owner: RecordId,
        id: RecordId,
        changes: &FeedbackChanges,
    ) -> Result<Option<Feedback>, DbError> {
        let query = format!(
            "UPDATE feedbacks SET \
                 customer_name = COALESCE($3, customer_name), \
                 customer_email = COALESCE($4, customer_email), \
                 customer_phone = COALESCE($5, customer_phone), \
                 rating = COALESCE($6, rating), \
                 comment = COALESCE($7, comment), \
                 sentiment = COALESCE($8, sentiment), \
                 status = COALESCE($9, status), \
                 is_urgent = COALESCE($10, is_urgent), \
                 location = COALESCE($11, location), \
                 category = COALESCE($12, category), \
                 nps_score = COALESCE($13, nps_score), \
                 updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {COLUMNS}"
        );
        let row: Option<FeedbackRow> = sqlx::query_as(&query)
            .bind(id)
            .bind(owner)
            .bind(changes.customer_name.as_deref())
            .bind(changes.customer_email.as_deref())
            .bind(changes.customer_phone.as_deref())
            .bind(changes.rating)
            .bind(changes.comment.as_deref())
            .bind(changes.sentiment.map(Sentiment::as_str))
            .bind(changes.status.map(|s| s.as_str()))
            .bind(changes.is_urgent)
            .bind(changes.location.as_deref())
            .bind(changes.category.as_deref())
            .bind(changes.nps_score)
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => {
                let mut records = Self::attach_children(pool, vec![row]).await?;
                Ok(records.pop())
            }
            None => Ok(None),
        }
    }

    /// Delete one of the owner's records. Returns `true` if a row was
    /// deleted. Tags and responses go with it (`ON DELETE CASCADE`).
    pub async fn delete(pool: &PgPool, owner: RecordId, id: RecordId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM feedbacks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Responses
    // -----------------------------------------------------------------------

    /// Insert a response for one of the owner's records.
    ///
    /// The insert selects from `feedbacks`, so it affects zero rows when
    /// the parent is missing or owned by someone else; the caller turns
    /// `None` into the right error.
    pub async fn insert_response(
        pool: &PgPool,
        owner: RecordId,
        feedback_id: RecordId,
        response_text: &str,
        template_used: Option<&str>,
    ) -> Result<Option<FeedbackResponse>, DbError> {
        let query = format!(
            "INSERT INTO feedback_responses \
                 (feedback_id, response_text, template_used, owner_id) \
             SELECT f.id, $3, $4, f.owner_id FROM feedbacks f \
             WHERE f.id = $1 AND f.owner_id = $2 \
             RETURNING {RESPONSE_COLUMNS}"
        );
        let row: Option<ResponseRow> = sqlx::query_as(&query)
            .bind(feedback_id)
            .bind(owner)
            .bind(response_text)
            .bind(template_used)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(FeedbackResponse::from))
    }

    /// Delete a response by id. Compensation path for a failed
    /// respond-and-transition composite.
    pub async fn delete_response(
        pool: &PgPool,
        owner: RecordId,
        response_id: RecordId,
    ) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM feedback_responses WHERE id = $1 AND owner_id = $2")
            .bind(response_id)
            .bind(owner)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Child loading
    // -----------------------------------------------------------------------

    /// Batch-load tags and responses for a set of rows and convert them
    /// into typed records, preserving row order.
    async fn attach_children(
        pool: &PgPool,
        rows: Vec<FeedbackRow>,
    ) -> Result<Vec<Feedback>, DbError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<RecordId> = rows.iter().map(|row| row.id).collect();

        // Tags are a set; read them in a stable order (same-transaction
        // inserts share one created_at).
        let tag_rows: Vec<(RecordId, String)> = sqlx::query_as(
            "SELECT feedback_id, tag FROM feedback_tags \
             WHERE feedback_id = ANY($1) \
             ORDER BY tag",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;
        let mut tags_by_feedback: HashMap<RecordId, Vec<String>> = HashMap::new();
        for (feedback_id, tag) in tag_rows {
            tags_by_feedback.entry(feedback_id).or_default().push(tag);
        }

        let response_query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM feedback_responses \
             WHERE feedback_id = ANY($1) \
             ORDER BY created_at"
        );
        let response_rows: Vec<ResponseRow> = sqlx::query_as(&response_query)
            .bind(&ids)
            .fetch_all(pool)
            .await?;
        let mut responses_by_feedback: HashMap<RecordId, Vec<FeedbackResponse>> = HashMap::new();
        for row in response_rows {
            responses_by_feedback
                .entry(row.feedback_id)
                .or_default()
                .push(FeedbackResponse::from(row));
        }

        rows.into_iter()
            .map(|row| {
                let tags = tags_by_feedback.remove(&row.id).unwrap_or_default();
                let responses = responses_by_feedback.remove(&row.id).unwrap_or_default();
                row.into_record(tags, responses)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Query rendering
// ---------------------------------------------------------------------------

/// Append the owner scope and all predicates as a WHERE clause.
fn push_scope(builder: &mut QueryBuilder<'_, Postgres>, owner: RecordId, predicates: &[Predicate]) {
    builder.push(" WHERE owner_id = ").push_bind(owner);
    for predicate in predicates {
        match predicate {
            Predicate::Search(term) => {
                let pattern = format!("%{}%", escape_like(term));
                builder.push(" AND (customer_name ILIKE ");
                builder.push_bind(pattern.clone());
                builder.push(" OR comment ILIKE ");
                builder.push_bind(pattern);
                builder.push(")");
            }
            Predicate::RatingEq(rating) => {
                builder.push(" AND rating = ").push_bind(*rating);
            }
            Predicate::StatusEq(status) => {
                builder.push(" AND status = ").push_bind(status.as_str());
            }
            Predicate::SentimentEq(sentiment) => {
                builder.push(" AND sentiment = ").push_bind(sentiment.as_str());
            }
            Predicate::CreatedSince(bound) => {
                builder.push(" AND created_at >= ").push_bind(*bound);
            }
        }
    }
}

/// Render the ORDER BY terms; earlier terms take precedence.
fn order_sql(order: &[OrderSpec]) -> String {
    if order.is_empty() {
        return "created_at DESC".to_string();
    }
    let terms: Vec<String> = order
        .iter()
        .map(|spec| {
            let column = match spec.key {
                OrderKey::CreatedAt => "created_at",
                OrderKey::Rating => "rating",
                OrderKey::Urgency => "is_urgent",
            };
            let direction = if spec.descending { "DESC" } else { "ASC" };
            format!("{column} {direction}")
        })
        .collect();
    terms.join(", ")
}

/// Escape LIKE wildcards in a user-supplied search term. The backslash is
/// PostgreSQL's default LIKE escape character.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
