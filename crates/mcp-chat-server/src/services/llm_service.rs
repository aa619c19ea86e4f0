use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::LlmConfig;
use crate::models::chat::ChatMessage;
use crate::utils::error::LlmError;

/// Trait for the hosted chat-completion backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub messages: &'a [ChatMessage],
    pub model: &'a str,
    pub temperature: f64,
    pub stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Groq's OpenAI-compatible chat completions endpoint
#[derive(Clone)]
pub struct LlmService {
    client: Client,
    api_key: String,
    config: LlmConfig,
}

impl LlmService {
    pub fn new(api_key: impl Into<String>, config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Generate completion without streaming (wait for full response)
    pub async fn generate_chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        debug!(
            "Requesting completion from {} with {} messages",
            self.config.model,
            messages.len()
        );

        let request = ChatCompletionRequest {
            messages,
            model: &self.config.model,
            temperature: self.config.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or(LlmError::NoChoices)
    }
}

#[async_trait]
impl CompletionProvider for LlmService {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.generate_chat(messages).await
    }
}
