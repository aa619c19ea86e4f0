use std::sync::Arc;
use axum::extract::FromRef;

use crate::config::Settings;
use crate::services::ChatService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ChatService>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(chat_service: ChatService, settings: Settings) -> Self {
        Self {
            chat_service: Arc::new(chat_service),
            settings: Arc::new(settings),
        }
    }
}

impl FromRef<AppState> for Arc<ChatService> {
    fn from_ref(state: &AppState) -> Self {
        state.chat_service.clone()
    }
}

impl FromRef<AppState> for Arc<Settings> {
    fn from_ref(state: &AppState) -> Self {
        state.settings.clone()
    }
}
