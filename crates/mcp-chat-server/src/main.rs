use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

use mcp_chat_server::config::{Secrets, Settings};
use mcp_chat_server::services::ChatService;
use mcp_chat_server::utils::logger::init_logger;
use mcp_chat_server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (also pulls in .env)
    let settings = Settings::load()?;

    let _log_guard = init_logger(&settings.logging)?;
    info!("🚀 Starting MCP Chat Server...");
    info!("✅ Configuration loaded");

    // Missing keys or config files degrade features, never abort startup
    let secrets = Secrets::from_env();
    let chat_service = ChatService::initialize(&settings, &secrets).await;

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    let sweep_interval = Duration::from_secs(settings.chat.session_sweep_interval_seconds.max(1));
    let state = AppState::new(chat_service, settings);

    // Periodic sweep for sessions that are never accessed again
    let sessions = state.chat_service.sessions().clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            sessions.cleanup_expired();
        }
    });

    let app = build_router(state);

    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
