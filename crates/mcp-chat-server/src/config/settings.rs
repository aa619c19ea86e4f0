use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub pinecone: PineconeConfig,
    pub llm: LlmConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PineconeConfig {
    pub index_name: String,
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
    pub control_plane_url: String,
    pub api_version: String,
    pub index_ready_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatConfig {
    /// Number of session turns interpolated into the prompt
    pub history_window: usize,
    pub session_history_limit: usize,
    pub all_conversations_limit: usize,
    pub mcp_config_path: String,
    pub system_preamble: String,
    /// Idle time after which a session is dropped
    pub session_ttl_minutes: i64,
    pub session_sweep_interval_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set
    pub level: String,
    /// json | pretty
    pub format: String,
    pub directory: String,
    pub file_prefix: String,
}

/// API keys, read from the process environment only
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub pinecone_api_key: Option<String>,
    pub groq_api_key: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            pinecone_api_key: non_empty_var("PINECONE_API_KEY"),
            groq_api_key: non_empty_var("GROQ_API_KEY"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::builder()?
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Built-in defaults only, no file or environment layer
    pub fn defaults() -> Result<Self> {
        let settings: Settings = Self::builder()?.build()?.try_deserialize()?;
        Ok(settings)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8501)?
            .set_default("pinecone.index_name", "car-data-index")?
            .set_default("pinecone.dimension", 1024)?
            .set_default("pinecone.metric", "cosine")?
            .set_default("pinecone.cloud", "aws")?
            .set_default("pinecone.region", "us-east-1")?
            .set_default("pinecone.control_plane_url", "https://api.pinecone.io")?
            .set_default("pinecone.api_version", "2024-07")?
            .set_default("pinecone.index_ready_timeout_seconds", 120)?
            .set_default("llm.base_url", "https://api.groq.com/openai/v1")?
            .set_default("llm.model", "llama3-8b-8192")?
            .set_default("llm.temperature", 0.7)?
            .set_default("llm.timeout_seconds", 60)?
            .set_default("chat.history_window", 5)?
            .set_default("chat.session_history_limit", 50)?
            .set_default("chat.all_conversations_limit", 100)?
            .set_default("chat.mcp_config_path", "browser_mcp.json")?
            .set_default("chat.session_ttl_minutes", 360)?
            .set_default("chat.session_sweep_interval_seconds", 300)?
            .set_default("logging.level", "info,mcp_chat_server=debug")?
            .set_default("logging.format", "pretty")?
            .set_default("logging.directory", "logs")?
            .set_default("logging.file_prefix", "chat")?
            .set_default(
                "chat.system_preamble",
                "You are a helpful AI assistant with access to MCP servers.",
            )?;
        Ok(builder)
    }

    pub fn mcp_config_path(&self) -> PathBuf {
        PathBuf::from(&self.chat.mcp_config_path)
    }
}
