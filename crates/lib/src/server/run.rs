//! Server startup and graceful shutdown.

use super::routes::{build_router, AppState};
use crate::config::{self, Config, Settings};
use crate::telegram::{BotApi, TelegramClient};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Run the webhook server; binds to config.server.bind:config.server.port.
/// Resolves [`Settings`] (a bot token is required) and, when no bot user name is configured,
/// asks Telegram for it via getMe. Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_server(config: Config) -> Result<()> {
    let mut settings = Settings::resolve(&config)?;
    let bind = config.server.bind.trim();
    if !config::is_loopback_bind(bind) && settings.webhook_secret.is_none() {
        log::warn!(
            "binding to {} without a webhook secret; anyone can post updates (set BOT_WEBHOOK_SECRET)",
            bind
        );
    }

    let client = TelegramClient::new(settings.api_base.clone(), settings.token.clone());
    if settings.user_name.is_none() {
        match client.get_me().await {
            Ok(me) => {
                log::info!("bot identity: {} (id {})", me.first_name, me.id);
                settings.user_name = me.username;
            }
            Err(e) => log::warn!("getMe failed, using default display name: {}", e),
        }
    }
    log::info!("bot user name: {}", settings.display_name());
    match settings.webhook_url {
        Some(ref url) => log::info!("webhook URL: {} (register via /initiate)", url),
        None => log::warn!("no base URL configured; /initiate will fail until BOT_URL is set"),
    }

    let state = AppState::new(settings, Arc::new(client));
    let app = build_router(state);

    let bind_addr = format!("{}:{}", bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited")?;
    log::info!("server stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}
