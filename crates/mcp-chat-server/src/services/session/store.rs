use chrono::Duration;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::chat::{ChatTurn, SessionId};
use super::types::SessionState;

/// Idle sessions are dropped after six hours unless configured otherwise
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 6 * 60;

/// Thread-safe map of live sessions.
/// Entry guards are never held across an await point.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<DashMap<SessionId, SessionState>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(DEFAULT_SESSION_TTL_MINUTES))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            storage: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Start a new session with a generated id
    pub fn create(&self) -> SessionState {
        let state = SessionState::new();
        self.storage.insert(state.session_id.clone(), state.clone());
        info!("Created session {}", state.session_id);
        state
    }

    /// Returns None if not found or expired
    pub fn get(&self, session_id: &str) -> Option<SessionState> {
        let entry = self.storage.get(session_id)?;
        if entry.is_expired(self.ttl) {
            drop(entry);
            self.evict(session_id);
            return None;
        }
        Some(entry.value().clone())
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.get(session_id).is_some()
    }

    /// Append a turn and return the session's transcript after the append.
    /// `None` when the session does not exist or has expired.
    pub fn append(&self, session_id: &str, turn: ChatTurn) -> Option<Vec<ChatTurn>> {
        let mut entry = self.live_entry(session_id)?;
        entry.turns.push(turn);
        entry.touch();
        debug!("Session {} now has {} turns", session_id, entry.turns.len());
        Some(entry.turns.clone())
    }

    /// Drop the transcript but keep the id
    pub fn clear(&self, session_id: &str) -> Option<SessionState> {
        let mut entry = self.live_entry(session_id)?;
        entry.turns.clear();
        entry.touch();
        debug!("Cleared session {}", session_id);
        Some(entry.value().clone())
    }

    /// Replace a session with a brand-new one. The old id stops resolving.
    pub fn reset(&self, session_id: &str) -> Option<SessionState> {
        let (_, old) = self.storage.remove(session_id)?;
        if old.is_expired(self.ttl) {
            debug!("Session {} expired, removed", session_id);
            return None;
        }
        let state = self.create();
        info!("Session {} replaced by {}", session_id, state.session_id);
        Some(state)
    }

    /// Sweep every idle session. Returns the number removed.
    pub fn cleanup_expired(&self) -> usize {
        let before = self.storage.len();
        let ttl = self.ttl;
        self.storage.retain(|_, state| !state.is_expired(ttl));

        let removed = before.saturating_sub(self.storage.len());
        if removed > 0 {
            info!("Cleaned up {} expired sessions", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    fn live_entry(
        &self,
        session_id: &str,
    ) -> Option<dashmap::mapref::one::RefMut<'_, SessionId, SessionState>> {
        let entry = self.storage.get_mut(session_id)?;
        if entry.is_expired(self.ttl) {
            drop(entry);
            self.evict(session_id);
            return None;
        }
        Some(entry)
    }

    // Lazy deletion, re-checked under the write lock
    fn evict(&self, session_id: &str) {
        let ttl = self.ttl;
        if self
            .storage
            .remove_if(session_id, |_, state| state.is_expired(ttl))
            .is_some()
        {
            debug!("Session {} expired, removed", session_id);
        }
    }

    #[cfg(test)]
    fn backdate(&self, session_id: &str, by: Duration) {
        if let Some(mut entry) = self.storage.get_mut(session_id) {
            entry.last_activity = entry.last_activity - by;
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
