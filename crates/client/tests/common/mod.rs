//! Shared fixtures for the coordination tests: an in-memory
//! [`FeedbackStore`] with controllable completion and failure points.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{oneshot, Mutex};
use uuid::Uuid;

use feedo_client::store::FeedbackStore;
use feedo_client::subscription::RecordSubscription;
use feedo_core::error::FeedoError;
use feedo_core::feedback::{
    Feedback, FeedbackChanges, FeedbackPage, FeedbackResponse, FeedbackStatus, NewFeedback,
    ResponseTemplate, Sentiment, SourceChannel,
};
use feedo_core::query::{OrderKey, OrderSpec, Predicate, QueryDescription};
use feedo_core::stats::FeedbackStats;
use feedo_core::types::{RecordId, Timestamp};
use feedo_events::{EventBus, EventFilter, RecordEvent};

/// Install a subscriber so `RUST_LOG=debug cargo test` shows the
/// coordination traces. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

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

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory [`FeedbackStore`] mirroring the Postgres store's semantics:
/// owner scoping, transition enforcement, miss classification, and event
/// publishing.
///
/// Tests can additionally park a listing query behind a gate (keyed by its
/// search term) to control completion order, force the next query to fail,
/// and force response deletes to fail.
pub struct MemoryStore {
    records: Mutex<Vec<Feedback>>,
    templates: Mutex<Vec<ResponseTemplate>>,
    stats: Mutex<Option<FeedbackStats>>,
    bus: Arc<EventBus>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    fail_next_query: Mutex<Option<String>>,
    fail_response_deletes: AtomicBool,
    queries_served: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(Vec::new()),
            templates: Mutex::new(Vec::new()),
            stats: Mutex::new(None),
            bus: Arc::new(EventBus::default()),
            gates: Mutex::new(HashMap::new()),
            fail_next_query: Mutex::new(None),
            fail_response_deletes: AtomicBool::new(false),
            queries_served: AtomicUsize::new(0),
        })
    }

    /// Park the listing query whose search term equals `key` until the
    /// returned sender fires.
    pub async fn gate_query(&self, key: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().await.insert(key.to_string(), rx);
        tx
    }

    /// Make the next listing query fail with a transport error.
    pub async fn fail_next_query(&self, message: &str) {
        *self.fail_next_query.lock().await = Some(message.to_string());
    }

    /// Make every `delete_response` fail with a transport error.
    pub fn fail_response_deletes(&self, fail: bool) {
        self.fail_response_deletes.store(fail, Ordering::SeqCst);
    }

    /// Configure the precomputed summary `fetch_stats` returns.
    pub async fn set_stats(&self, stats: Option<FeedbackStats>) {
        *self.stats.lock().await = stats;
    }

    /// Number of listing queries that ran to completion.
    pub fn queries_served(&self) -> usize {
        self.queries_served.load(Ordering::SeqCst)
    }

    /// Rewrite a record's creation time.
    pub async fn backdate(&self, id: RecordId, created_at: Timestamp) {
        let mut records = self.records.lock().await;
        if let Some(record) = records.iter_mut().find(|r| r.id == id) {
            record.created_at = created_at;
            record.updated_at = created_at;
        }
    }

    /// Current state of one record, regardless of owner.
    pub async fn record(&self, id: RecordId) -> Option<Feedback> {
        self.records.lock().await.iter().find(|r| r.id == id).cloned()
    }

    async fn await_gate(&self, query: &QueryDescription) {
        let key = query.predicates.iter().find_map(|p| match p {
            Predicate::Search(term) => Some(term.clone()),
            _ => None,
        });
        let gate = match key {
            Some(key) => self.gates.lock().await.remove(&key),
            None => None,
        };
        if let Some(gate) = gate {
            // Sender dropped counts as released.
            let _ = gate.await;
        }
    }

    fn classify_miss(records: &[Feedback], owner: RecordId, id: RecordId) -> FeedoError {
        match records.iter().find(|r| r.id == id) {
            Some(_) => FeedoError::PermissionDenied {
                entity: "feedback",
                id,
            },
            None => FeedoError::NotFound {
                entity: "feedback",
                id,
            },
        }
    }
}

fn matches(record: &Feedback, predicates: &[Predicate]) -> bool {
    predicates.iter().all(|predicate| match predicate {
        Predicate::Search(term) => {
            let term = term.to_lowercase();
            record.customer_name.to_lowercase().contains(&term)
                || record.comment.to_lowercase().contains(&term)
        }
        Predicate::RatingEq(rating) => record.rating == *rating,
        Predicate::StatusEq(status) => record.status == *status,
        Predicate::SentimentEq(sentiment) => record.sentiment == *sentiment,
        Predicate::CreatedSince(bound) => record.created_at >= *bound,
    })
}

fn sort_records(records: &mut [Feedback], order: &[OrderSpec]) {
    use std::cmp::Ordering as CmpOrdering;

    records.sort_by(|a, b| {
        if order.is_empty() {
            // Same default as the SQL rendering: newest first.
            return b.created_at.cmp(&a.created_at);
        }
        for spec in order {
            let ord = match spec.key {
                OrderKey::CreatedAt => a.created_at.cmp(&b.created_at),
                OrderKey::Rating => a.rating.cmp(&b.rating),
                OrderKey::Urgency => a.is_urgent.cmp(&b.is_urgent),
            };
            let ord = if spec.descending { ord.reverse() } else { ord };
            if ord != CmpOrdering::Equal {
                return ord;
            }
        }
        CmpOrdering::Equal
    });
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn query_feedbacks(
        &self,
        owner: RecordId,
        query: &QueryDescription,
    ) -> Result<FeedbackPage, FeedoError> {
        self.await_gate(query).await;
        if let Some(message) = self.fail_next_query.lock().await.take() {
            return Err(FeedoError::Transport(message));
        }
        self.queries_served.fetch_add(1, Ordering::SeqCst);

        let records = self.records.lock().await;
        let mut matching: Vec<Feedback> = records
            .iter()
            .filter(|r| r.owner_id == owner && matches(r, &query.predicates))
            .cloned()
            .collect();
        sort_records(&mut matching, &query.order);

        let total_count = matching.len() as i64;
        if let Some(window) = query.pagination {
            let start = (window.offset.max(0) as usize).min(matching.len());
            let end = (start + window.limit.max(0) as usize).min(matching.len());
            matching = matching[start..end].to_vec();
        }
        Ok(FeedbackPage {
            records: matching,
            total_count,
        })
    }

    async fn fetch_stats(&self, _owner: RecordId) -> Result<Option<FeedbackStats>, FeedoError> {
        Ok(self.stats.lock().await.clone())
    }

    async fn list_templates(&self, owner: RecordId) -> Result<Vec<ResponseTemplate>, FeedoError> {
        let templates = self.templates.lock().await;
        Ok(templates
            .iter()
            .filter(|t| t.is_default || t.owner_id == Some(owner))
            .cloned()
            .collect())
    }

    async fn create_feedback(
        &self,
        owner: RecordId,
        input: &NewFeedback,
    ) -> Result<Feedback, FeedoError> {
        let now = Utc::now();
        let mut tags: Vec<String> = input
            .tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
        tags.sort();

        let record = Feedback {
            id: Uuid::new_v4(),
            customer_name: input.customer_name.clone(),
            customer_email: input.customer_email.clone(),
            customer_phone: input.customer_phone.clone(),
            rating: input.rating,
            comment: input.comment.clone(),
            sentiment: Sentiment::for_rating(input.rating),
            status: FeedbackStatus::Pending,
            is_urgent: false,
            source: input.source,
            location: input.location.clone(),
            category: input.category.clone(),
            nps_score: input.nps_score,
            owner_id: owner,
            created_at: now,
            updated_at: now,
            tags,
            responses: Vec::new(),
        };
        self.records.lock().await.push(record.clone());
        self.bus.publish(RecordEvent::inserted(record.clone()));
        Ok(record)
    }

    async fn update_feedback(
        &self,
        owner: RecordId,
        id: RecordId,
        changes: &FeedbackChanges,
    ) -> Result<Feedback, FeedoError> {
        let mut records = self.records.lock().await;
        let index = match records.iter().position(|r| r.id == id && r.owner_id == owner) {
            Some(index) => index,
            None => return Err(Self::classify_miss(&records, owner, id)),
        };
        let record = &mut records[index];

        if let Some(next) = changes.status {
            if !record.status.can_transition(next) {
                return Err(FeedoError::Validation(format!(
                    "cannot transition feedback from {} to {}",
                    record.status.as_str(),
                    next.as_str()
                )));
            }
        }

        if let Some(value) = &changes.customer_name {
            record.customer_name = value.clone();
        }
        if let Some(value) = &changes.customer_email {
            record.customer_email = value.clone();
        }
        if let Some(value) = &changes.customer_phone {
            record.customer_phone = Some(value.clone());
        }
        if let Some(value) = changes.rating {
            record.rating = value;
        }
        if let Some(value) = &changes.comment {
            record.comment = value.clone();
        }
        if let Some(value) = changes.sentiment {
            record.sentiment = value;
        }
        if let Some(value) = changes.status {
            record.status = value;
        }
        if let Some(value) = changes.is_urgent {
            record.is_urgent = value;
        }
        if let Some(value) = &changes.location {
            record.location = Some(value.clone());
        }
        if let Some(value) = &changes.category {
            record.category = Some(value.clone());
        }
        if let Some(value) = changes.nps_score {
            record.nps_score = Some(value);
        }
        record.updated_at = Utc::now();

        let record = record.clone();
        self.bus.publish(RecordEvent::updated(record.clone()));
        Ok(record)
    }

    async fn delete_feedback(&self, owner: RecordId, id: RecordId) -> Result<(), FeedoError> {
        let mut records = self.records.lock().await;
        match records.iter().position(|r| r.id == id && r.owner_id == owner) {
            Some(index) => {
                records.remove(index);
                self.bus.publish(RecordEvent::deleted(owner, id));
                Ok(())
            }
            None => Err(Self::classify_miss(&records, owner, id)),
        }
    }

    async fn insert_response(
        &self,
        owner: RecordId,
        feedback_id: RecordId,
        text: &str,
        template: Option<&str>,
    ) -> Result<FeedbackResponse, FeedoError> {
        let mut records = self.records.lock().await;
        let index = match records
            .iter()
            .position(|r| r.id == feedback_id && r.owner_id == owner)
        {
            Some(index) => index,
            None => return Err(Self::classify_miss(&records, owner, feedback_id)),
        };

        let response = FeedbackResponse {
            id: Uuid::new_v4(),
            feedback_id,
            response_text: text.to_string(),
            template_used: template.map(str::to_string),
            owner_id: owner,
            created_at: Utc::now(),
        };
        records[index].responses.push(response.clone());
        Ok(response)
    }

    async fn delete_response(
        &self,
        owner: RecordId,
        response_id: RecordId,
    ) -> Result<(), FeedoError> {
        if self.fail_response_deletes.load(Ordering::SeqCst) {
            return Err(FeedoError::Transport(
                "response delete unavailable".to_string(),
            ));
        }

        let mut records = self.records.lock().await;
        for record in records.iter_mut().filter(|r| r.owner_id == owner) {
            if let Some(index) = record.responses.iter().position(|r| r.id == response_id) {
                record.responses.remove(index);
                return Ok(());
            }
        }
        Err(FeedoError::NotFound {
            entity: "response",
            id: response_id,
        })
    }

    fn subscribe(&self, filter: EventFilter) -> RecordSubscription {
        RecordSubscription::new(&self.bus, filter)
    }
}
