//! Filtered consumption of the record event channel.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use feedo_core::feedback::Feedback;
use feedo_core::types::RecordId;
use feedo_events::{EventBus, EventFilter, RecordEvent, RecordEventKind};

use crate::store::FeedbackStore;

// ---------------------------------------------------------------------------
// RecordSubscription
// ---------------------------------------------------------------------------

/// A filtered stream of [`RecordEvent`]s.
///
/// Events that do not match the filter are skipped transparently. Delivery
/// is best-effort: a subscriber that falls behind the channel capacity
/// observes lag and misses the dropped events. Dropping the subscription
/// unsubscribes.
pub struct RecordSubscription {
    receiver: broadcast::Receiver<RecordEvent>,
    filter: EventFilter,
}

impl RecordSubscription {
    /// Subscribe to a bus, keeping only events that match `filter`.
    pub fn new(bus: &EventBus, filter: EventFilter) -> Self {
        Self {
            receiver: bus.subscribe(),
            filter,
        }
    }

    /// The next matching event, or `None` once the bus is gone.
    ///
    /// Lag is logged and skipped over; the subscription keeps receiving
    /// whatever is still in the channel.
    pub async fn next(&mut self) -> Option<RecordEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Some(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Record subscription lagged, events were missed");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FeedbackListener
// ---------------------------------------------------------------------------

/// Background consumer that invokes a callback for every feedback inserted
/// for one account.
///
/// [`close`](FeedbackListener::close) stops the task and waits for it, so
/// no callback runs after it returns. Dropping the listener also stops the
/// task, without the wait.
pub struct FeedbackListener {
    cancel: CancellationToken,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl FeedbackListener {
    /// Spawn the consumer task for `owner`'s new records.
    pub fn spawn<F>(store: Arc<dyn FeedbackStore>, owner: RecordId, callback: F) -> Self
    where
        F: Fn(Feedback) + Send + 'static,
    {
        let filter = EventFilter::for_owner(owner).with_kinds([RecordEventKind::Inserted]);
        let mut subscription = store.subscribe(filter);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => {
                        tracing::debug!(owner = %owner, "Feedback listener cancelled");
                        break;
                    }
                    event = subscription.next() => match event {
                        Some(event) => {
                            if let Some(record) = event.record {
                                callback(record);
                            }
                        }
                        // Bus gone; nothing further will arrive.
                        None => break,
                    }
                }
            }
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Stop the listener and wait for the task to finish.
    pub async fn close(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for FeedbackListener {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
