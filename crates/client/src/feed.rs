//! Fetch coordination for the feedback listing.
//!
//! [`FeedbackFeed`] owns the listing state for one account: the current
//! filters, the in-flight request, and a `watch` channel of
//! [`FeedSnapshot`]s observers render from. Responses commit in issue
//! order per feed; a response that is no longer the latest is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

use feedo_core::feedback::Feedback;
use feedo_core::filter::FeedbackFilters;
use feedo_core::query::build_query;
use feedo_core::types::RecordId;

use crate::store::FeedbackStore;

/// Observable state of a [`FeedbackFeed`].
///
/// On a failed fetch `error` is set and the previous records are kept, so
/// observers never lose the last good listing.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub records: Vec<Feedback>,
    pub total_count: i64,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Coordinates listing fetches for one account.
///
/// Construction does not fetch; call [`refetch`](FeedbackFeed::refetch)
/// for the initial load. Designed to be wrapped in `Arc` and shared.
pub struct FeedbackFeed {
    store: Arc<dyn FeedbackStore>,
    owner: RecordId,
    filters: Mutex<FeedbackFilters>,
    /// Latest issued request token; completions with an older token are
    /// stale and must not commit.
    token: Arc<AtomicU64>,
    state: watch::Sender<FeedSnapshot>,
    cancel: CancellationToken,
}

impl FeedbackFeed {
    pub fn new(store: Arc<dyn FeedbackStore>, owner: RecordId) -> Self {
        let (state, _) = watch::channel(FeedSnapshot::default());
        Self {
            store,
            owner,
            filters: Mutex::new(FeedbackFilters::default()),
            token: Arc::new(AtomicU64::new(0)),
            state,
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the filters. Identical filters are a no-op; a change issues
    /// a new fetch that supersedes whatever is in flight.
    pub async fn set_filters(&self, filters: FeedbackFilters) {
        let token = {
            let mut current = self.filters.lock().await;
            if *current == filters {
                tracing::debug!("Filters unchanged, not refetching");
                return;
            }
            *current = filters.clone();
            self.issue_token()
        };
        self.start_fetch(token, filters);
    }

    /// Fetch again with the current filters, superseding any in-flight
    /// request.
    pub async fn refetch(&self) {
        let (token, filters) = {
            let current = self.filters.lock().await;
            (self.issue_token(), current.clone())
        };
        self.start_fetch(token, filters);
    }

    /// The filters currently applied.
    pub async fn filters(&self) -> FeedbackFilters {
        self.filters.lock().await.clone()
    }

    /// The current state.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver for state changes.
    pub fn watch(&self) -> watch::Receiver<FeedSnapshot> {
        self.state.subscribe()
    }

    /// Tear the feed down. In-flight completions are discarded; the
    /// snapshot freezes at its last value.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Tokens are issued under the filters lock so their order matches the
    /// order of filter updates.
    fn issue_token(&self) -> u64 {
        self.token.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn start_fetch(&self, token: u64, filters: FeedbackFilters) {
        self.state.send_modify(|snapshot| {
            snapshot.is_loading = true;
            snapshot.error = None;
        });

        let store = Arc::clone(&self.store);
        let owner = self.owner;
        let latest = Arc::clone(&self.token);
        let state = self.state.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let query = build_query(&filters, Utc::now());
            let result = store.query_feedbacks(owner, &query).await;

            if cancel.is_cancelled() || latest.load(Ordering::SeqCst) != token {
                tracing::debug!(token, "Discarding stale listing response");
                return;
            }

            match result {
                Ok(page) => state.send_modify(|snapshot| {
                    snapshot.records = page.records;
                    snapshot.total_count = page.total_count;
                    snapshot.is_loading = false;
                    snapshot.error = None;
                }),
                Err(e) => {
                    tracing::warn!(error = %e, "Listing fetch failed");
                    state.send_modify(|snapshot| {
                        snapshot.error = Some(e.to_string());
                        snapshot.is_loading = false;
                    });
                }
            }
        });
    }
}
