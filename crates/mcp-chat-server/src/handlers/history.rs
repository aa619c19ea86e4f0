use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::models::chat::{LimitQuery, SessionHistoryResponse, StoredConversationsResponse};
use crate::services::ChatService;
use crate::utils::error::ApiError;

/// Stored turns of one session, newest first
pub async fn session_history_handler(
    State(chat_service): State<Arc<ChatService>>,
    State(settings): State<Arc<Settings>>,
    Path(session_id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<SessionHistoryResponse>, ApiError> {
    let limit = query.limit.unwrap_or(settings.chat.session_history_limit);
    info!("History request: session={}, limit={}", session_id, limit);

    let records = chat_service.session_history(&session_id, limit).await?;

    Ok(Json(SessionHistoryResponse {
        session_id,
        total: records.len(),
        records,
    }))
}

/// Every stored turn (up to `limit`), grouped by session
pub async fn stored_conversations_handler(
    State(chat_service): State<Arc<ChatService>>,
    State(settings): State<Arc<Settings>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<StoredConversationsResponse>, ApiError> {
    let limit = query.limit.unwrap_or(settings.chat.all_conversations_limit);
    info!("Stored conversations request: limit={}", limit);

    let sessions = chat_service.stored_conversations(limit).await?;
    let total_turns = sessions.iter().map(|s| s.turns.len()).sum();

    Ok(Json(StoredConversationsResponse {
        total_turns,
        sessions,
    }))
}
