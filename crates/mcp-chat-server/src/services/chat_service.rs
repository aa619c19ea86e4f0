use chrono::Duration;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::{McpConfigStatus, McpServers, Secrets, Settings};
use crate::models::chat::{ChatTurn, SessionId};
use crate::models::turn_record::{ConversationTurnRecord, SessionConversations};
use crate::services::conversation_store::ConversationStore;
use crate::services::llm_service::{CompletionProvider, LlmService};
use crate::services::pinecone::PineconeClient;
use crate::services::response_generator::{PromptBuilder, ResponseGenerator};
use crate::services::session::SessionStore;
use crate::utils::error::{ApiError, StoreError};
use crate::utils::timestamp::local_iso_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// User-visible banner produced while wiring up external services
#[derive(Debug, Clone, Serialize)]
pub struct StartupNotice {
    pub level: NoticeLevel,
    pub message: String,
}

impl StartupNotice {
    fn success(message: impl Into<String>) -> Self {
        let message = message.into();
        info!("✅ {}", message);
        Self { level: NoticeLevel::Success, message }
    }

    fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!("❌ {}", message);
        Self { level: NoticeLevel::Error, message }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub session_id: SessionId,
    pub reply: String,
    pub message_count: usize,
    /// Set when the turn could not be written to the conversation store
    pub storage_error: Option<String>,
}

/// Everything the chat pipeline needs, built once at startup
pub struct ChatService {
    sessions: SessionStore,
    generator: ResponseGenerator,
    prompt: PromptBuilder,
    store: Option<ConversationStore>,
    mcp_servers: McpServers,
    notices: Vec<StartupNotice>,
}

impl ChatService {
    pub fn new(
        settings: &Settings,
        provider: Option<Arc<dyn CompletionProvider>>,
        store: Option<ConversationStore>,
        mcp_servers: McpServers,
        notices: Vec<StartupNotice>,
    ) -> Self {
        Self {
            sessions: SessionStore::with_ttl(Duration::minutes(settings.chat.session_ttl_minutes)),
            generator: ResponseGenerator::new(provider),
            prompt: PromptBuilder::new(
                settings.chat.system_preamble.clone(),
                settings.chat.history_window,
            ),
            store,
            mcp_servers,
            notices,
        }
    }

    /// Connect to Pinecone, read the MCP listing and build the Groq client.
    /// Each failure becomes a notice; none of them stops startup.
    pub async fn initialize(settings: &Settings, secrets: &Secrets) -> Self {
        let mut notices = Vec::new();

        let store = match &secrets.pinecone_api_key {
            None => {
                notices.push(StartupNotice::error("Pinecone API key missing"));
                None
            }
            Some(api_key) => {
                let client = PineconeClient::new(api_key.clone(), &settings.pinecone);
                match client.ensure_index(&settings.pinecone).await {
                    Ok(index) => {
                        notices.push(StartupNotice::success("Connected to Pinecone database"));
                        Some(ConversationStore::new(Arc::new(index), settings.pinecone.dimension))
                    }
                    Err(e) => {
                        notices.push(StartupNotice::error(format!("Failed to connect to Pinecone: {}", e)));
                        None
                    }
                }
            }
        };

        let mcp_servers = McpServers::load(settings.mcp_config_path());
        notices.push(match mcp_servers.status() {
            McpConfigStatus::Loaded => StartupNotice::success(format!(
                "Loaded {} MCP servers: {}",
                mcp_servers.len(),
                mcp_servers.names().join(", ")
            )),
            McpConfigStatus::NotFound(path) => StartupNotice::error(format!(
                "MCP config file ({}) not found",
                path.display()
            )),
            McpConfigStatus::Invalid(reason) => {
                StartupNotice::error(format!("Error loading MCP config: {}", reason))
            }
        });

        let provider: Option<Arc<dyn CompletionProvider>> = match &secrets.groq_api_key {
            None => {
                notices.push(StartupNotice::error("GROQ_API_KEY missing"));
                None
            }
            Some(api_key) => match LlmService::new(api_key.clone(), settings.llm.clone()) {
                Ok(service) => {
                    notices.push(StartupNotice::success(format!(
                        "Groq client ready ({})",
                        service.model()
                    )));
                    Some(Arc::new(service))
                }
                Err(e) => {
                    notices.push(StartupNotice::error(format!("Failed to create Groq client: {}", e)));
                    None
                }
            },
        };

        Self::new(settings, provider, store, mcp_servers, notices)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn notices(&self) -> &[StartupNotice] {
        &self.notices
    }

    pub fn server_names(&self) -> &[String] {
        self.mcp_servers.names()
    }

    pub fn store_connected(&self) -> bool {
        self.store.is_some()
    }

    pub fn llm_ready(&self) -> bool {
        self.generator.is_ready()
    }

    /// user input → session → prompt → completion → session → store
    pub async fn send_message(&self, session_id: &str, message: &str) -> Result<ChatOutcome, ApiError> {
        if message.trim().is_empty() {
            return Err(ApiError::BadRequest("Message must not be empty".to_string()));
        }

        let turns = self
            .sessions
            .append(session_id, ChatTurn::user(message))
            .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", session_id)))?;

        let prompt = self.prompt.build(self.mcp_servers.names(), &turns, message);
        let reply = self.generator.complete(&prompt).await;

        // The session may have been reset while the completion was in flight.
        let message_count = self
            .sessions
            .append(session_id, ChatTurn::assistant(reply.clone()))
            .map(|turns| turns.len())
            .unwrap_or_default();

        let storage_error = self.save_turn(session_id, message, &reply).await;

        Ok(ChatOutcome {
            session_id: session_id.to_string(),
            reply,
            message_count,
            storage_error,
        })
    }

    async fn save_turn(&self, session_id: &str, message: &str, reply: &str) -> Option<String> {
        let store = self.store.as_ref()?;
        let timestamp = local_iso_timestamp();

        match store.record(session_id, message, reply, &timestamp).await {
            Ok(_) => None,
            Err(e) => {
                error!("Failed to save turn for session {}: {}", session_id, e);
                Some(format!("Failed to save conversation: {}", e))
            }
        }
    }

    fn require_store(&self) -> Result<&ConversationStore, ApiError> {
        self.store
            .as_ref()
            .ok_or_else(|| ApiError::ServiceUnavailable("Pinecone not connected".to_string()))
    }

    pub async fn session_history(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurnRecord>, ApiError> {
        let store = self.require_store()?;
        Ok(store.history(session_id, limit).await)
    }

    pub async fn stored_conversations(&self, limit: usize) -> Result<Vec<SessionConversations>, ApiError> {
        let store = self.require_store()?;
        store.all_records(limit).await.map_err(|e: StoreError| {
            error!("Error retrieving conversations: {}", e);
            ApiError::Storage(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm_service::MockCompletionProvider;
    use crate::services::vector_index::MockVectorIndex;
    use crate::utils::error::LlmError;

    fn settings() -> Settings {
        Settings::defaults().unwrap()
    }

    fn servers(names: &[&str]) -> McpServers {
        let raw = serde_json::json!({
            "mcpServers": names.iter().map(|n| (n.to_string(), serde_json::json!({}))).collect::<serde_json::Map<_, _>>()
        });
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("browser_mcp.json");
        std::fs::write(&path, raw.to_string()).unwrap();
        McpServers::load(&path)
    }

    #[tokio::test]
    async fn test_send_message_runs_pipeline() {
        let mut provider = MockCompletionProvider::new();
        provider
            .expect_generate()
            .withf(|messages| {
                let prompt = &messages[0].content;
                prompt.contains("You have access to: ['browser']")
                    && prompt.contains("User: find me a car\n")
                    && prompt.ends_with("Current user input: find me a car")
            })
            .times(1)
            .returning(|_| Ok("Here are some cars".to_string()));

        let mut index = MockVectorIndex::new();
        index
            .expect_upsert()
            .withf(|vectors| {
                vectors.len() == 1
                    && vectors[0].values.len() == 1024
                    && vectors[0].metadata.get("user_message").and_then(|v| v.as_str()) == Some("find me a car")
                    && vectors[0].metadata.get("ai_response").and_then(|v| v.as_str()) == Some("Here are some cars")
            })
            .times(1)
            .returning(|v| Ok(v.len()));

        let service = ChatService::new(
            &settings(),
            Some(Arc::new(provider)),
            Some(ConversationStore::new(Arc::new(index), 1024)),
            servers(&["browser"]),
            Vec::new(),
        );

        let session = service.sessions().create();
        let outcome = service.send_message(&session.session_id, "find me a car").await.unwrap();

        assert_eq!(outcome.reply, "Here are some cars");
        assert_eq!(outcome.message_count, 2);
        assert!(outcome.storage_error.is_none());

        let turns = service.sessions().get(&session.session_id).unwrap().turns;
        assert_eq!(turns, vec![ChatTurn::user("find me a car"), ChatTurn::assistant("Here are some cars")]);
    }

    #[tokio::test]
    async fn test_degraded_service_still_replies() {
        let service = ChatService::new(&settings(), None, None, McpServers::empty(McpConfigStatus::Loaded), Vec::new());
        let session = service.sessions().create();

        let outcome = service.send_message(&session.session_id, "hello").await.unwrap();
        assert_eq!(outcome.reply, "❌ Groq client not initialized.");
        assert!(outcome.storage_error.is_none());
        assert!(!service.store_connected());
        assert!(!service.llm_ready());
    }

    #[tokio::test]
    async fn test_llm_failure_is_recorded_as_reply() {
        let mut provider = MockCompletionProvider::new();
        provider
            .expect_generate()
            .returning(|_| Err(LlmError::NoChoices));

        let service = ChatService::new(&settings(), Some(Arc::new(provider)), None, McpServers::empty(McpConfigStatus::Loaded), Vec::new());
        let session = service.sessions().create();

        let outcome = service.send_message(&session.session_id, "hello").await.unwrap();
        assert!(outcome.reply.starts_with("❌ Error generating response:"));
        assert_eq!(service.sessions().get(&session.session_id).unwrap().message_count(), 2);
    }

    #[tokio::test]
    async fn test_storage_failure_is_surfaced_not_fatal() {
        let mut provider = MockCompletionProvider::new();
        provider.expect_generate().returning(|_| Ok("reply".to_string()));

        let mut index = MockVectorIndex::new();
        index
            .expect_upsert()
            .returning(|_| Err(StoreError::Api { status: 500, body: "write failed".into() }));

        let service = ChatService::new(
            &settings(),
            Some(Arc::new(provider)),
            Some(ConversationStore::new(Arc::new(index), 16)),
            McpServers::empty(McpConfigStatus::Loaded),
            Vec::new(),
        );
        let session = service.sessions().create();

        let outcome = service.send_message(&session.session_id, "hello").await.unwrap();
        assert_eq!(outcome.reply, "reply");
        assert!(outcome.storage_error.unwrap().contains("write failed"));
    }

    #[tokio::test]
    async fn test_unknown_session_and_empty_message() {
        let service = ChatService::new(&settings(), None, None, McpServers::empty(McpConfigStatus::Loaded), Vec::new());

        assert!(matches!(
            service.send_message("nope", "hi").await,
            Err(ApiError::NotFound(_))
        ));

        let session = service.sessions().create();
        assert!(matches!(
            service.send_message(&session.session_id, "   ").await,
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_history_requires_store() {
        let service = ChatService::new(&settings(), None, None, McpServers::empty(McpConfigStatus::Loaded), Vec::new());
        assert!(matches!(
            service.session_history("s1", 50).await,
            Err(ApiError::ServiceUnavailable(_))
        ));
        assert!(matches!(
            service.stored_conversations(100).await,
            Err(ApiError::ServiceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_initialize_without_keys_degrades() {
        let mut settings = settings();
        let dir = tempfile::tempdir().unwrap();
        settings.chat.mcp_config_path = dir.path().join("browser_mcp.json").display().to_string();

        let service = ChatService::initialize(&settings, &Secrets::default()).await;

        assert!(!service.store_connected());
        assert!(!service.llm_ready());
        assert!(service.server_names().is_empty());

        let messages: Vec<&str> = service.notices().iter().map(|n| n.message.as_str()).collect();
        assert!(messages.contains(&"Pinecone API key missing"));
        assert!(messages.contains(&"GROQ_API_KEY missing"));
        assert!(messages.iter().any(|m| m.contains("not found")));
        assert!(service.notices().iter().all(|n| n.level == NoticeLevel::Error));
    }
}
