//! In-process record event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the fan-out hub for [`RecordEvent`]s. It is shared via
//! `Arc<EventBus>` between the mutation layer (publisher) and the feed and
//! listener subscribers.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use feedo_core::feedback::Feedback;
use feedo_core::types::{RecordId, Timestamp};

// ---------------------------------------------------------------------------
// RecordEvent
// ---------------------------------------------------------------------------

/// What happened to a feedback record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordEventKind {
    Inserted,
    Updated,
    Deleted,
}

/// A change notification for one feedback record.
///
/// Constructed via [`RecordEvent::inserted`], [`RecordEvent::updated`], or
/// [`RecordEvent::deleted`]. Delete events carry no record body since the
/// row is already gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordEvent {
    pub kind: RecordEventKind,

    /// Account the record belongs to.
    pub owner_id: RecordId,

    pub feedback_id: RecordId,

    /// Full record after the change; `None` for deletes.
    pub record: Option<Feedback>,

    /// When the event was published (UTC).
    pub timestamp: Timestamp,
}

impl RecordEvent {
    /// Event for a freshly inserted record.
    pub fn inserted(record: Feedback) -> Self {
        Self::carrying(RecordEventKind::Inserted, record)
    }

    /// Event for an updated record, carrying the post-update state.
    pub fn updated(record: Feedback) -> Self {
        Self::carrying(RecordEventKind::Updated, record)
    }

    /// Event for a deleted record.
    pub fn deleted(owner_id: RecordId, feedback_id: RecordId) -> Self {
        Self {
            kind: RecordEventKind::Deleted,
            owner_id,
            feedback_id,
            record: None,
            timestamp: Utc::now(),
        }
    }

    fn carrying(kind: RecordEventKind, record: Feedback) -> Self {
        Self {
            kind,
            owner_id: record.owner_id,
            feedback_id: record.id,
            record: Some(record),
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventFilter
// ---------------------------------------------------------------------------

/// Subscriber-side predicate over [`RecordEvent`]s.
///
/// An empty `kinds` list matches every kind.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub owner_id: Option<RecordId>,
    pub kinds: Vec<RecordEventKind>,
}

impl EventFilter {
    /// Match everything published for one account.
    pub fn for_owner(owner_id: RecordId) -> Self {
        Self {
            owner_id: Some(owner_id),
            kinds: Vec::new(),
        }
    }

    /// Restrict the filter to the given kinds.
    pub fn with_kinds(mut self, kinds: impl Into<Vec<RecordEventKind>>) -> Self {
        self.kinds = kinds.into();
        self
    }

    pub fn matches(&self, event: &RecordEvent) -> bool {
        if let Some(owner) = self.owner_id {
            if event.owner_id != owner {
                return false;
            }
        }
        self.kinds.is_empty() || self.kinds.contains(&event.kind)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`RecordEvent`]. Delivery is
/// best-effort: a subscriber that falls more than the channel capacity
/// behind observes `RecvError::Lagged` and misses the dropped events.
///
/// # Usage
///
/// ```rust
/// use feedo_events::bus::{EventBus, RecordEvent};
/// use uuid::Uuid;
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(RecordEvent::deleted(Uuid::new_v4(), Uuid::new_v4()));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<RecordEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: RecordEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<RecordEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
