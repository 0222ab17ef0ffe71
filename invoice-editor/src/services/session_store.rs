//! In-memory registry of invoice sessions.

use super::session::InvoiceSession;
use crate::models::EditPolicy;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, InvoiceSession>>,
    seller_state_code: Option<String>,
}

impl SessionStore {
    pub fn new(seller_state_code: Option<String>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            seller_state_code,
        }
    }

    pub fn create(&self, edit_policy: EditPolicy) -> Uuid {
        let id = Uuid::new_v4();
        let session = InvoiceSession::new(id, edit_policy, self.seller_state_code.clone());
        self.sessions.insert(id, session);
        tracing::info!(session_id = %id, edit_policy = edit_policy.as_str(), "Session created");
        id
    }

    /// Run `f` against the session while holding its entry. Returns `None`
    /// when the session does not exist. Touches the session's activity clock.
    ///
    /// `f` must not block: the shard stays locked until it returns.
    pub fn with_session<T>(&self, id: Uuid, f: impl FnOnce(&mut InvoiceSession) -> T) -> Option<T> {
        let mut entry = self.sessions.get_mut(&id)?;
        entry.touch();
        Some(f(entry.value_mut()))
    }

    pub fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.remove(&id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Session removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop every session idle for longer than `max_idle`.
    pub fn purge_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.idle_for() <= max_idle);
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            tracing::info!(purged, remaining = self.sessions.len(), "Purged idle sessions");
        }
        purged
    }
}
