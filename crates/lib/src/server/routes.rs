//! Router and request handlers.

use crate::config::Settings;
use crate::handler;
use crate::telegram::{BotApi, TelegramUpdate};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Header Telegram sends with every webhook POST when a secret was registered.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

const WEBHOOK_SETUP_OK: &str = "webhook setup ok";
const WEBHOOK_SETUP_FAILED: &str = "webhook setup failed";

/// Shared state: immutable settings and the bot client.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub bot: Arc<dyn BotApi>,
}

impl AppState {
    pub fn new(settings: Settings, bot: Arc<dyn BotApi>) -> Self {
        Self {
            settings: Arc::new(settings),
            bot,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status_http))
        .route("/initiate", get(initiate).post(initiate))
        .route("/webhook", post(telegram_webhook))
        .with_state(state)
}

/// Call setWebhook with `<base url>/webhook`. True only when the platform reports success.
pub async fn register_webhook(bot: &dyn BotApi, settings: &Settings) -> bool {
    let Some(ref url) = settings.webhook_url else {
        log::warn!("webhook not registered: no base URL configured (set BOT_URL or bot.url)");
        return false;
    };
    match bot
        .set_webhook(url, settings.webhook_secret.as_deref())
        .await
    {
        Ok(true) => {
            log::info!("webhook registered: {}", url);
            true
        }
        Ok(false) => {
            log::warn!("setWebhook returned false for {}", url);
            false
        }
        Err(e) => {
            log::warn!("setWebhook failed for {}: {}", url, e);
            false
        }
    }
}

/// GET / — static status line with the bot's display name.
async fn status_http(State(state): State<AppState>) -> String {
    format!("The {} app is running.", state.settings.display_name())
}

/// GET|POST /initiate — register the webhook with Telegram.
async fn initiate(State(state): State<AppState>) -> &'static str {
    if register_webhook(state.bot.as_ref(), &state.settings).await {
        WEBHOOK_SETUP_OK
    } else {
        WEBHOOK_SETUP_FAILED
    }
}

/// POST /webhook — receives Telegram update JSON; verifies optional secret, then replies inline.
/// Always 200 once the secret matches, so Telegram never retries delivery.
async fn telegram_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    if let Some(ref expected) = state.settings.webhook_secret {
        let provided = headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if provided != expected.as_str() {
            log::warn!("webhook request rejected: secret token mismatch");
            return (StatusCode::FORBIDDEN, "forbidden");
        }
    }
    let update: TelegramUpdate = match serde_json::from_slice(&body) {
        Ok(u) => u,
        Err(e) => {
            log::warn!("ignoring malformed webhook payload: {}", e);
            return (StatusCode::OK, "ok");
        }
    };
    let outcome = handler::handle_update(state.bot.as_ref(), &state.settings, &update).await;
    log::debug!("update {} handled: {:?}", update.update_id, outcome);
    (StatusCode::OK, "ok")
}
