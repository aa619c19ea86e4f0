use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::turn_record::{ConversationTurnRecord, SessionConversations};

/// Opaque per-browser session identifier (uuid v4 string)
pub type SessionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Speaker label used inside the prompt transcript
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One message in the session's visible transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Wire message for the chat-completion API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

// ===== REQUEST MODELS =====

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

// ===== RESPONSE MODELS =====

#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    pub message_count: usize,
    pub turns: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub session_id: SessionId,
    pub reply: String,
    pub message_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionHistoryResponse {
    pub session_id: SessionId,
    pub total: usize,
    pub records: Vec<ConversationTurnRecord>,
}

#[derive(Debug, Serialize)]
pub struct StoredConversationsResponse {
    pub total_turns: usize,
    pub sessions: Vec<SessionConversations>,
}
