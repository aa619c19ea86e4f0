use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::models::chat::{SendMessageRequest, SendMessageResponse};
use crate::services::ChatService;
use crate::utils::error::ApiError;

pub async fn send_message_handler(
    State(chat_service): State<Arc<ChatService>>,
    Path(session_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let start_time = Instant::now();

    info!(
        "Chat request: session={}, message_len={}",
        session_id,
        request.message.len()
    );

    let outcome = chat_service.send_message(&session_id, &request.message).await?;

    info!(
        "Chat completed in {}ms (stored={})",
        start_time.elapsed().as_millis(),
        outcome.storage_error.is_none()
    );

    Ok(Json(SendMessageResponse {
        session_id: outcome.session_id,
        reply: outcome.reply,
        message_count: outcome.message_count,
        storage_error: outcome.storage_error,
    }))
}
