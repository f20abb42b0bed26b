//! Chat Countdown - A chat-driven countdown timer
//!
//! This is the main entry point for the chat-countdown server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use chat_countdown::{
    api::create_router,
    config::Config,
    services::{ChatSender, LogChatSender, WebhookChatSender},
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("chat_countdown={},tower_http=info", config.log_level()))
        .init();

    info!("Starting chat-countdown server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}", config.host, config.port);

    let chat: Arc<dyn ChatSender> = match &config.chat_webhook_url {
        Some(url) => {
            info!("Chat replies go to webhook {}", url);
            Arc::new(WebhookChatSender::new(url.clone(), config.gateway_identifier.clone()))
        }
        None => {
            info!("No chat webhook configured; chat replies are logged only");
            Arc::new(LogChatSender)
        }
    };

    // Create application state
    let state = Arc::new(AppState::new(config.port, config.host.clone(), chat));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /gateway/events - Ingest a gateway frame (chat message, tip, lifecycle)");
    info!("  GET  /overlay/state  - Current countdown snapshot");
    info!("  GET  /overlay/stream - Countdown snapshots as Server-Sent Events");
    info!("  GET  /status         - Countdown and server status");
    info!("  GET  /health         - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
