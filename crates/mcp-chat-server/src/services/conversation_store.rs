//! Conversation memory on top of a hosted vector index.
//!
//! The index is used as a key-value store: every turn gets a pseudo-vector
//! derived from an md5 of its text, and reads are a zero-vector query with an
//! exact `session_id` filter followed by a client-side timestamp sort. The
//! ranking returned by the index carries no meaning.

use md5::{Digest, Md5};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::turn_record::{group_by_session, ConversationTurnRecord, SessionConversations};
use crate::services::vector_index::{VectorIndex, VectorQuery, VectorRecord};
use crate::utils::error::StoreError;

/// Scalar derived from the first 32 bits of `md5(user_message ++ ai_response)`
pub fn pseudo_vector_value(user_message: &str, ai_response: &str) -> f64 {
    let mut hasher = Md5::new();
    hasher.update(user_message.as_bytes());
    hasher.update(ai_response.as_bytes());
    let digest = hasher.finalize();

    let prefix = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    f64::from(prefix) / 1e8
}

/// The scalar broadcast across every dimension
pub fn pseudo_vector(user_message: &str, ai_response: &str, dimension: usize) -> Vec<f32> {
    vec![pseudo_vector_value(user_message, ai_response) as f32; dimension]
}

#[derive(Clone)]
pub struct ConversationStore {
    index: Arc<dyn VectorIndex>,
    dimension: usize,
}

impl ConversationStore {
    pub fn new(index: Arc<dyn VectorIndex>, dimension: usize) -> Self {
        Self { index, dimension }
    }

    /// Upsert one turn. Errors go back to the caller untouched.
    pub async fn record(
        &self,
        session_id: &str,
        user_message: &str,
        ai_response: &str,
        timestamp: &str,
    ) -> Result<ConversationTurnRecord, StoreError> {
        let record = ConversationTurnRecord::new(session_id, user_message, ai_response, timestamp);

        let vector = VectorRecord {
            id: record.record_id.clone(),
            values: pseudo_vector(user_message, ai_response, self.dimension),
            metadata: record.to_metadata(),
        };

        self.index.upsert(vec![vector]).await?;
        debug!("Recorded turn {} for session {}", record.record_id, session_id);
        Ok(record)
    }

    /// Newest-first turns of one session. Any failure yields an empty list.
    pub async fn history(&self, session_id: &str, limit: usize) -> Vec<ConversationTurnRecord> {
        let mut filter = Map::new();
        filter.insert("session_id".to_string(), Value::String(session_id.to_string()));

        let records = match self.query_records(limit, Some(filter)).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Error retrieving conversation history for {}: {}", session_id, e);
                return Vec::new();
            }
        };

        let mut records: Vec<ConversationTurnRecord> = records
            .into_iter()
            .filter(|r| r.belongs_to(session_id))
            .take(limit)
            .collect();

        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }

    /// Unfiltered listing for the admin view, grouped by session.
    pub async fn all_records(&self, limit: usize) -> Result<Vec<SessionConversations>, StoreError> {
        let records = self.query_records(limit, None).await?;
        Ok(group_by_session(records))
    }

    async fn query_records(
        &self,
        limit: usize,
        filter: Option<Map<String, Value>>,
    ) -> Result<Vec<ConversationTurnRecord>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let matches = self
            .index
            .query(VectorQuery {
                vector: vec![0.0; self.dimension],
                top_k: limit,
                filter,
                include_metadata: true,
            })
            .await?;

        Ok(matches
            .into_iter()
            .filter_map(|m| {
                let metadata = m.metadata?;
                Some(ConversationTurnRecord::from_metadata(&m.id, metadata))
            })
            .collect())
    }
}
