use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::services::ChatService;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pinecone_connected: bool,
    llm_ready: bool,
}

/// Always 200: missing backends degrade the chat but never take it down
pub async fn readiness_check(
    State(chat_service): State<Arc<ChatService>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    (
        StatusCode::OK,
        Json(ReadinessResponse {
            pinecone_connected: chat_service.store_connected(),
            llm_ready: chat_service.llm_ready(),
        }),
    )
}
