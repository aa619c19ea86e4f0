//! Tool-server listing read from `browser_mcp.json`.
//!
//! Only the key set of `mcpServers` is used. The servers are never contacted;
//! their names are interpolated into the prompt as a capability hint.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct McpConfigFile {
    #[serde(default, rename = "mcpServers")]
    mcp_servers: Map<String, Value>,
}

/// Outcome of reading the config file. Every variant leaves the app running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McpConfigStatus {
    Loaded,
    NotFound(PathBuf),
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct McpServers {
    names: Vec<String>,
    status: McpConfigStatus,
}

impl McpServers {
    pub fn empty(status: McpConfigStatus) -> Self {
        Self {
            names: Vec::new(),
            status,
        }
    }

    /// Read the server names. Never fails: a missing or malformed file
    /// degrades to an empty list carrying the reason.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!("MCP config file not found: {}", path.display());
            return Self::empty(McpConfigStatus::NotFound(path.to_path_buf()));
        }

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read MCP config {}: {}", path.display(), e);
                return Self::empty(McpConfigStatus::Invalid(e.to_string()));
            }
        };

        match Self::parse(&raw) {
            Ok(names) => {
                info!("Loaded {} MCP servers from {}", names.len(), path.display());
                Self {
                    names,
                    status: McpConfigStatus::Loaded,
                }
            }
            Err(e) => {
                warn!("Failed to parse MCP config {}: {}", path.display(), e);
                Self::empty(McpConfigStatus::Invalid(e.to_string()))
            }
        }
    }

    /// Server names in file order.
    pub fn parse(raw: &str) -> Result<Vec<String>, serde_json::Error> {
        let file: McpConfigFile = serde_json::from_str(raw)?;
        Ok(file.mcp_servers.keys().cloned().collect())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn status(&self) -> &McpConfigStatus {
        &self.status
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
