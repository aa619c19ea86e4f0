//! Minimal Pinecone REST client: index bootstrap on the control plane,
//! upsert and query on the index's data-plane host.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::PineconeConfig;
use crate::services::vector_index::{ScoredVector, VectorIndex, VectorQuery, VectorRecord};
use crate::utils::error::StoreError;

const READY_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: IndexSpec<'a>,
}

#[derive(Debug, Serialize)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Debug, Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub dimension: Option<usize>,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub status: IndexStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a Map<String, Value>>,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ScoredVector>,
}

/// Shared request plumbing for both planes
#[derive(Clone)]
struct Transport {
    client: Client,
    api_key: String,
    api_version: String,
}

impl Transport {
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", &self.api_version)
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Api { status, body })
    }
}

/// Control-plane client
#[derive(Clone)]
pub struct PineconeClient {
    transport: Transport,
    control_plane_url: String,
}

impl PineconeClient {
    pub fn new(api_key: impl Into<String>, config: &PineconeConfig) -> Self {
        Self {
            transport: Transport {
                client: Client::new(),
                api_key: api_key.into(),
                api_version: config.api_version.clone(),
            },
            control_plane_url: config.control_plane_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn list_indexes(&self) -> Result<Vec<IndexDescription>, StoreError> {
        let url = format!("{}/indexes", self.control_plane_url);
        let response = self.transport.authorize(self.transport.client.get(&url)).send().await?;
        let list: IndexList = Transport::check(response).await?.json().await?;
        Ok(list.indexes)
    }

    pub async fn describe_index(&self, name: &str) -> Result<IndexDescription, StoreError> {
        let url = format!("{}/indexes/{}", self.control_plane_url, name);
        let response = self.transport.authorize(self.transport.client.get(&url)).send().await?;
        Ok(Transport::check(response).await?.json().await?)
    }

    pub async fn create_index(&self, config: &PineconeConfig) -> Result<IndexDescription, StoreError> {
        let url = format!("{}/indexes", self.control_plane_url);
        let request = CreateIndexRequest {
            name: &config.index_name,
            dimension: config.dimension,
            metric: &config.metric,
            spec: IndexSpec {
                serverless: ServerlessSpec {
                    cloud: &config.cloud,
                    region: &config.region,
                },
            },
        };

        let response = self
            .transport
            .authorize(self.transport.client.post(&url))
            .json(&request)
            .send()
            .await?;
        Ok(Transport::check(response).await?.json().await?)
    }

    /// Create the configured index when absent, then hand back a data-plane handle.
    pub async fn ensure_index(&self, config: &PineconeConfig) -> Result<PineconeIndex, StoreError> {
        let existing = self.list_indexes().await?;

        let description = match existing.into_iter().find(|i| i.name == config.index_name) {
            Some(description) => {
                debug!("Using existing Pinecone index '{}'", description.name);
                description
            }
            None => {
                info!(
                    "Creating Pinecone index '{}' (dim={}, metric={}, {}/{})",
                    config.index_name, config.dimension, config.metric, config.cloud, config.region
                );
                self.create_index(config).await?;
                self.wait_until_ready(
                    &config.index_name,
                    Duration::from_secs(config.index_ready_timeout_seconds),
                )
                .await?
            }
        };

        if description.host.is_empty() {
            return Err(StoreError::MissingHost(description.name));
        }
        Self::check_shape(&description, config)?;

        let index = PineconeIndex::new(self.transport.clone(), &description.host);
        info!("Pinecone index '{}' served from {}", description.name, index.base_url());
        Ok(index)
    }

    /// Every upsert would fail against an index of another width.
    fn check_shape(description: &IndexDescription, config: &PineconeConfig) -> Result<(), StoreError> {
        if let Some(actual) = description.dimension {
            if actual != config.dimension {
                return Err(StoreError::DimensionMismatch {
                    index: description.name.clone(),
                    expected: config.dimension,
                    actual,
                });
            }
        }
        if let Some(metric) = &description.metric {
            if !metric.eq_ignore_ascii_case(&config.metric) {
                warn!(
                    "Index '{}' uses metric '{}', configured '{}'",
                    description.name, metric, config.metric
                );
            }
        }
        Ok(())
    }

    async fn wait_until_ready(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<IndexDescription, StoreError> {
        let started = Instant::now();
        loop {
            let description = self.describe_index(name).await?;
            if description.status.ready && !description.host.is_empty() {
                info!("Pinecone index '{}' ready after {:?}", name, started.elapsed());
                return Ok(description);
            }
            if started.elapsed() >= timeout {
                return Err(StoreError::IndexNotReady(name.to_string()));
            }
            debug!("Index '{}' not ready yet (state={:?})", name, description.status.state);
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

/// Data-plane handle bound to one index host
#[derive(Clone)]
pub struct PineconeIndex {
    transport: Transport,
    base_url: String,
}

impl PineconeIndex {
    fn new(transport: Transport, host: &str) -> Self {
        let host = host.trim_end_matches('/');
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };
        Self { transport, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, vectors: Vec<VectorRecord>) -> Result<usize, StoreError> {
        let url = format!("{}/vectors/upsert", self.base_url);
        let response = self
            .transport
            .authorize(self.transport.client.post(&url))
            .json(&UpsertRequest { vectors: &vectors })
            .send()
            .await?;

        let body: UpsertResponse = Transport::check(response).await?.json().await?;
        debug!("Upserted {} vectors", body.upserted_count);
        Ok(body.upserted_count)
    }

    async fn query(&self, query: VectorQuery) -> Result<Vec<ScoredVector>, StoreError> {
        let url = format!("{}/query", self.base_url);
        let request = QueryRequest {
            vector: &query.vector,
            top_k: query.top_k,
            filter: query.filter.as_ref(),
            include_metadata: query.include_metadata,
            include_values: false,
        };

        let response = self
            .transport
            .authorize(self.transport.client.post(&url))
            .json(&request)
            .send()
            .await?;

        let body: QueryResponse = Transport::check(response).await?.json().await?;
        debug!("Query returned {} matches", body.matches.len());
        Ok(body.matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> PineconeConfig {
        let mut config = Settings::defaults().unwrap().pinecone;
        config.control_plane_url = server.uri();
        config.index_ready_timeout_seconds = 5;
        config
    }

    #[tokio::test]
    async fn test_ensure_index_reuses_existing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes"))
            .and(header("Api-Key", "pc-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "indexes": [{"name": "car-data-index", "host": server.uri(), "status": {"ready": true}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/indexes"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let client = PineconeClient::new("pc-key", &config_for(&server));
        let index = client.ensure_index(&config_for(&server)).await.unwrap();
        assert_eq!(index.base_url(), server.uri());
    }

    #[tokio::test]
    async fn test_ensure_index_creates_missing_serverless_index() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"indexes": []})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/indexes"))
            .and(body_partial_json(json!({
                "name": "car-data-index",
                "dimension": 1024,
                "metric": "cosine",
                "spec": {"serverless": {"cloud": "aws", "region": "us-east-1"}}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "name": "car-data-index", "status": {"ready": false, "state": "Initializing"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/indexes/car-data-index"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "car-data-index", "host": "car-data-index-abc.svc.pinecone.io",
                "status": {"ready": true, "state": "Ready"}
            })))
            .mount(&server)
            .await;

        let config = config_for(&server);
        let index = PineconeClient::new("pc-key", &config).ensure_index(&config).await.unwrap();
        assert_eq!(index.base_url(), "https://car-data-index-abc.svc.pinecone.io");
    }

    #[tokio::test]
    async fn test_control_plane_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API Key"))
            .mount(&server)
            .await;

        let config = config_for(&server);
        let result = PineconeClient::new("bad", &config).ensure_index(&config).await;
        match result {
            Err(StoreError::Api { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("Invalid API Key"));
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[tokio::test]
    async fn test_readiness_wait_is_bounded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"indexes": []})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/indexes"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "car-data-index"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/indexes/car-data-index"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "car-data-index", "host": "", "status": {"ready": false, "state": "Initializing"}
            })))
            .mount(&server)
            .await;

        let mut config = config_for(&server);
        config.index_ready_timeout_seconds = 1;

        let started = Instant::now();
        let result = PineconeClient::new("pc-key", &config).ensure_index(&config).await;
        assert!(matches!(result, Err(StoreError::IndexNotReady(ref name)) if name == "car-data-index"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_existing_index_without_host_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "indexes": [{"name": "car-data-index", "host": "", "status": {"ready": true}}]
            })))
            .mount(&server)
            .await;

        let config = config_for(&server);
        let result = PineconeClient::new("pc-key", &config).ensure_index(&config).await;
        assert!(matches!(result, Err(StoreError::MissingHost(ref name)) if name == "car-data-index"));
    }

    #[tokio::test]
    async fn test_existing_index_with_other_dimension_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "indexes": [{
                    "name": "car-data-index", "host": server.uri(), "dimension": 768,
                    "metric": "cosine", "status": {"ready": true}
                }]
            })))
            .mount(&server)
            .await;

        let config = config_for(&server);
        let result = PineconeClient::new("pc-key", &config).ensure_index(&config).await;
        match result {
            Err(StoreError::DimensionMismatch { expected, actual, .. }) => {
                assert_eq!(expected, 1024);
                assert_eq!(actual, 768);
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected a dimension mismatch"),
        }
    }

    #[tokio::test]
    async fn test_query_sends_filter_and_parses_matches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_partial_json(json!({
                "topK": 3,
                "filter": {"session_id": "s-1"},
                "includeMetadata": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matches": [{"id": "s-1_t", "score": 0.0, "metadata": {"session_id": "s-1"}}],
                "namespace": ""
            })))
            .mount(&server)
            .await;

        let config = config_for(&server);
        let index = PineconeIndex::new(
            PineconeClient::new("pc-key", &config).transport,
            &server.uri(),
        );

        let mut filter = Map::new();
        filter.insert("session_id".into(), json!("s-1"));
        let matches = index
            .query(VectorQuery {
                vector: vec![0.0; 4],
                top_k: 3,
                filter: Some(filter),
                include_metadata: true,
            })
            .await
            .unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "s-1_t");
    }
}
