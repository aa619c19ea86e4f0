use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::models::chat::SessionSnapshot;
use crate::services::ChatService;
use crate::utils::error::ApiError;

pub async fn create_session_handler(
    State(chat_service): State<Arc<ChatService>>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let session = chat_service.sessions().create();
    (StatusCode::CREATED, Json(session.snapshot()))
}

pub async fn get_session_handler(
    State(chat_service): State<Arc<ChatService>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    chat_service
        .sessions()
        .get(&session_id)
        .map(|session| Json(session.snapshot()))
        .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", session_id)))
}

/// "Clear Session Memory": empty the transcript, keep the id
pub async fn clear_session_handler(
    State(chat_service): State<Arc<ChatService>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = chat_service
        .sessions()
        .clear(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", session_id)))?;

    info!("Session {} cleared", session_id);
    Ok(Json(session.snapshot()))
}

/// "New Session": a fresh id and an empty transcript
pub async fn reset_session_handler(
    State(chat_service): State<Arc<ChatService>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = chat_service
        .sessions()
        .reset(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", session_id)))?;

    Ok(Json(session.snapshot()))
}
