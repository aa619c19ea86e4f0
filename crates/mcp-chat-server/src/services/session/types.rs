use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::chat::{ChatTurn, SessionId, SessionSnapshot};

#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: SessionId,
    pub turns: Vec<ChatTurn>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl SessionState {
    /// Fresh session with a generated id
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(session_id: impl Into<SessionId>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            turns: Vec::new(),
            created_at: now,
            last_activity: now,
        }
    }

    /// Idle for longer than `ttl`
    pub fn is_expired(&self, ttl: Duration) -> bool {
        Utc::now() - self.last_activity > ttl
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn message_count(&self) -> usize {
        self.turns.len()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            created_at: self.created_at,
            message_count: self.turns.len(),
            turns: self.turns.clone(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
