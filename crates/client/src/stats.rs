//! Fetch coordination for the stats summary.
//!
//! [`StatsView`] mirrors the feed's state surface for the aggregate
//! numbers. It prefers the backend's precomputed summary and falls back to
//! aggregating the owner's records locally when there is none, so an
//! account with zero records shows the all-zero stats rather than an
//! error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

use feedo_core::error::FeedoError;
use feedo_core::query::QueryDescription;
use feedo_core::stats::{aggregate, FeedbackStats};
use feedo_core::types::RecordId;

use crate::store::FeedbackStore;

/// Observable state of a [`StatsView`].
#[derive(Debug, Clone, Default)]
pub struct StatsSnapshot {
    pub stats: FeedbackStats,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Coordinates stats fetches, independent of the listing feed.
pub struct StatsView {
    store: Arc<dyn FeedbackStore>,
    owner: Mutex<Option<RecordId>>,
    token: Arc<AtomicU64>,
    state: watch::Sender<StatsSnapshot>,
    cancel: CancellationToken,
}

impl StatsView {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        let (state, _) = watch::channel(StatsSnapshot::default());
        Self {
            store,
            owner: Mutex::new(None),
            token: Arc::new(AtomicU64::new(0)),
            state,
            cancel: CancellationToken::new(),
        }
    }

    /// Point the view at an account. A no-op when the owner is unchanged;
    /// `None` resets to the zero stats without fetching.
    pub async fn set_owner(&self, owner: Option<RecordId>) {
        let token = {
            let mut current = self.owner.lock().await;
            if *current == owner {
                return;
            }
            *current = owner;
            self.issue_token()
        };
        match owner {
            Some(owner) => self.start_fetch(token, owner),
            None => self.state.send_modify(|snapshot| {
                *snapshot = StatsSnapshot::default();
            }),
        }
    }

    /// Recompute for the current owner even though it has not changed.
    pub async fn refetch(&self) {
        let issued = {
            let current = self.owner.lock().await;
            current.map(|owner| (self.issue_token(), owner))
        };
        if let Some((token, owner)) = issued {
            self.start_fetch(token, owner);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<StatsSnapshot> {
        self.state.subscribe()
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    fn issue_token(&self) -> u64 {
        self.token.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn start_fetch(&self, token: u64, owner: RecordId) {
        self.state.send_modify(|snapshot| {
            snapshot.is_loading = true;
            snapshot.error = None;
        });

        let store = Arc::clone(&self.store);
        let latest = Arc::clone(&self.token);
        let state = self.state.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let result = load(store, owner).await;

            if cancel.is_cancelled() || latest.load(Ordering::SeqCst) != token {
                tracing::debug!(token, "Discarding stale stats response");
                return;
            }

            match result {
                Ok(stats) => state.send_modify(|snapshot| {
                    snapshot.stats = stats;
                    snapshot.is_loading = false;
                    snapshot.error = None;
                }),
                Err(e) => {
                    tracing::warn!(error = %e, "Stats fetch failed");
                    state.send_modify(|snapshot| {
                        snapshot.error = Some(e.to_string());
                        snapshot.is_loading = false;
                    });
                }
            }
        });
    }
}

/// Precomputed summary when the backend has one, local aggregation over
/// the full listing otherwise.
async fn load(store: Arc<dyn FeedbackStore>, owner: RecordId) -> Result<FeedbackStats, FeedoError> {
    if let Some(stats) = store.fetch_stats(owner).await? {
        return Ok(stats);
    }
    let page = store
        .query_feedbacks(owner, &QueryDescription::unfiltered())
        .await?;
    Ok(aggregate(&page.records, Utc::now()))
}
