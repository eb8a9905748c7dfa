//! Process-wide session state.
//!
//! [`SessionManager`] is the single writer: it loads the session once from
//! its [`SessionSource`], then forwards source change notifications into a
//! `watch` channel that any component may read. Sessions carrying a
//! placeholder identity are never published.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use feedo_core::error::FeedoError;
use feedo_core::types::RecordId;

use crate::store::SessionSource;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// An authenticated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: RecordId,
    pub email: String,
}

impl Session {
    /// A session whose identity is the nil UUID is a placeholder from a
    /// half-initialized auth layer and must never reach readers.
    pub fn is_placeholder(&self) -> bool {
        self.user_id.is_nil()
    }
}

// ---------------------------------------------------------------------------
// SessionManager
// ---------------------------------------------------------------------------

/// Owns the published session state.
///
/// Readers use [`current`](SessionManager::current) or
/// [`watch`](SessionManager::watch); only the manager writes.
pub struct SessionManager {
    source: Arc<dyn SessionSource>,
    state: watch::Sender<Option<Session>>,
    cancel: CancellationToken,
}

impl SessionManager {
    /// Load the current session and start forwarding source changes.
    pub async fn start(source: Arc<dyn SessionSource>) -> Result<Self, FeedoError> {
        let initial = sanitize(source.current_session().await?);
        let (state, _) = watch::channel(initial);
        let cancel = CancellationToken::new();

        let mut changes = source.changes();
        let task_state = state.clone();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => {
                        tracing::debug!("Session forwarding cancelled");
                        break;
                    }
                    changed = changes.changed() => {
                        if changed.is_err() {
                            // Source dropped; keep the last published value.
                            break;
                        }
                        let next = changes.borrow_and_update().clone();
                        task_state.send_replace(sanitize(next));
                    }
                }
            }
        });

        Ok(Self {
            source,
            state,
            cancel,
        })
    }

    /// The session as currently published.
    pub fn current(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    /// Receiver for session changes.
    pub fn watch(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    /// Sign out at the source. The published state clears when the source's
    /// change notification comes through.
    pub async fn sign_out(&self) -> Result<(), FeedoError> {
        self.source.sign_out().await
    }

    /// Stop forwarding source changes. The published state freezes at its
    /// last value.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

/// Drop placeholder identities before they are published.
fn sanitize(session: Option<Session>) -> Option<Session> {
    match session {
        Some(session) if session.is_placeholder() => {
            tracing::warn!("Dropping session with placeholder user id");
            None
        }
        other => other,
    }
}

// ---------------------------------------------------------------------------
// LocalSessionSource
// ---------------------------------------------------------------------------

/// In-process [`SessionSource`] for tests and embedding hosts that manage
/// sign-in themselves.
pub struct LocalSessionSource {
    state: watch::Sender<Option<Session>>,
}

impl LocalSessionSource {
    pub fn new(initial: Option<Session>) -> Self {
        let (state, _) = watch::channel(initial);
        Self { state }
    }

    /// Publish a new session, or `None` to sign out.
    pub fn set_session(&self, session: Option<Session>) {
        self.state.send_replace(session);
    }
}

#[async_trait]
impl SessionSource for LocalSessionSource {
    async fn current_session(&self) -> Result<Option<Session>, FeedoError> {
        Ok(self.state.borrow().clone())
    }

    fn changes(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    async fn sign_out(&self) -> Result<(), FeedoError> {
        self.state.send_replace(None);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
