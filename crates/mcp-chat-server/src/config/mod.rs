pub mod mcp_servers;
pub mod settings;

pub use mcp_servers::{McpConfigStatus, McpServers};
pub use settings::{ChatConfig, LlmConfig, LoggingConfig, PineconeConfig, Secrets, ServerConfig, Settings};
