use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::error::StoreError;

/// One vector with its attached metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorQuery {
    pub vector: Vec<f32>,
    pub top_k: usize,
    /// Exact-match metadata filter, e.g. `{"session_id": "..."}`
    pub filter: Option<Map<String, Value>>,
    pub include_metadata: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScoredVector {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Seam over the hosted index so the conversation store can be exercised offline
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Returns the number of upserted vectors
    async fn upsert(&self, vectors: Vec<VectorRecord>) -> Result<usize, StoreError>;

    async fn query(&self, query: VectorQuery) -> Result<Vec<ScoredVector>, StoreError>;
}
