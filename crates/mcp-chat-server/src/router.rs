use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/", get(handlers::ui::index))
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check));

    // JSON API driving the chat UI
    let api_routes = Router::new()
        .route("/api/status", get(handlers::status::status_handler))
        .route("/api/sessions", post(handlers::sessions::create_session_handler))
        .route("/api/sessions/{session_id}", get(handlers::sessions::get_session_handler))
        .route(
            "/api/sessions/{session_id}/messages",
            post(handlers::chat::send_message_handler),
        )
        .route(
            "/api/sessions/{session_id}/clear",
            post(handlers::sessions::clear_session_handler),
        )
        .route(
            "/api/sessions/{session_id}/reset",
            post(handlers::sessions::reset_session_handler),
        )
        .route(
            "/api/sessions/{session_id}/history",
            get(handlers::history::session_history_handler),
        )
        .route(
            "/api/conversations",
            get(handlers::history::stored_conversations_handler),
        );

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .with_state(state)
        // CORS
        .layer(CorsLayer::permissive())
        // Tracing
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
}
