use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::services::{ChatService, StartupNotice};

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub notices: Vec<StartupNotice>,
    pub mcp_servers: Vec<String>,
    pub pinecone_connected: bool,
    pub llm_ready: bool,
    pub active_sessions: usize,
}

pub async fn status_handler(State(chat_service): State<Arc<ChatService>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        notices: chat_service.notices().to_vec(),
        mcp_servers: chat_service.server_names().to_vec(),
        pinecone_connected: chat_service.store_connected(),
        llm_ready: chat_service.llm_ready(),
        active_sessions: chat_service.sessions().len(),
    })
}
