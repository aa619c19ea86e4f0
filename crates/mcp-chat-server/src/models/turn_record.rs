use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CONVERSATION_TURN_TYPE: &str = "conversation_turn";
const UNKNOWN_SESSION: &str = "Unknown";

/// A persisted turn, as attached to the vector record's metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurnRecord {
    #[serde(default)]
    pub record_id: String,
    /// `None` when the stored metadata carries no session id at all
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_message: String,
    #[serde(default)]
    pub ai_response: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl ConversationTurnRecord {
    pub fn new(
        session_id: impl Into<String>,
        user_message: impl Into<String>,
        ai_response: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        let session_id = session_id.into();
        let timestamp = timestamp.into();
        Self {
            record_id: format!("{}_{}", session_id, timestamp),
            session_id: Some(session_id),
            user_message: user_message.into(),
            ai_response: ai_response.into(),
            timestamp,
            kind: CONVERSATION_TURN_TYPE.to_string(),
        }
    }

    pub fn belongs_to(&self, session_id: &str) -> bool {
        self.session_id.as_deref() == Some(session_id)
    }

    /// Metadata map stored alongside the vector. `record_id` is the vector id.
    pub fn to_metadata(&self) -> Map<String, Value> {
        let mut metadata = Map::new();
        if let Some(session_id) = &self.session_id {
            metadata.insert("session_id".into(), Value::String(session_id.clone()));
        }
        metadata.insert("user_message".into(), Value::String(self.user_message.clone()));
        metadata.insert("ai_response".into(), Value::String(self.ai_response.clone()));
        metadata.insert("timestamp".into(), Value::String(self.timestamp.clone()));
        metadata.insert("type".into(), Value::String(self.kind.clone()));
        metadata
    }

    /// Rebuild from a query match. Field by field: missing values become empty,
    /// non-string values are kept in their JSON rendering.
    pub fn from_metadata(record_id: &str, metadata: Map<String, Value>) -> Self {
        Self {
            record_id: record_id.to_string(),
            session_id: field(&metadata, "session_id"),
            user_message: field(&metadata, "user_message").unwrap_or_default(),
            ai_response: field(&metadata, "ai_response").unwrap_or_default(),
            timestamp: field(&metadata, "timestamp").unwrap_or_default(),
            kind: field(&metadata, "type").unwrap_or_default(),
        }
    }
}

fn field(metadata: &Map<String, Value>, key: &str) -> Option<String> {
    match metadata.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// All stored turns of one session, oldest first
#[derive(Debug, Clone, Serialize)]
pub struct SessionConversations {
    pub session_id: String,
    pub turns: Vec<ConversationTurnRecord>,
}

/// Group records by session in first-seen order; each group ascending by timestamp.
pub fn group_by_session(records: Vec<ConversationTurnRecord>) -> Vec<SessionConversations> {
    let mut groups: Vec<SessionConversations> = Vec::new();

    for record in records {
        let session_id = record
            .session_id
            .clone()
            .unwrap_or_else(|| UNKNOWN_SESSION.to_string());

        match groups.iter_mut().find(|g| g.session_id == session_id) {
            Some(group) => group.turns.push(record),
            None => groups.push(SessionConversations {
                session_id,
                turns: vec![record],
            }),
        }
    }

    for group in &mut groups {
        group.turns.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    }

    groups
}
