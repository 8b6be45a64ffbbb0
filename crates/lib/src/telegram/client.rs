//! Bot API client: sendMessage, sendPhoto, setWebhook and getMe over HTTPS.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

/// Outbound operations the handler and server need from the platform.
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Send a text message, optionally as a reply to `reply_to`.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<(), TelegramError>;

    /// Send a photo by URL; Telegram fetches the image itself.
    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        reply_to: Option<i64>,
    ) -> Result<(), TelegramError>;

    /// Register the webhook URL (and optional secret). Returns the platform's result flag.
    async fn set_webhook(&self, url: &str, secret: Option<&str>) -> Result<bool, TelegramError>;

    /// Fetch the bot's own identity.
    async fn get_me(&self) -> Result<BotUser, TelegramError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("telegram request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("telegram api error: {0}")]
    Api(String),
}

/// Bot identity returned by getMe.
#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Every Bot API response is wrapped in this envelope, success or not.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

/// Client for the Telegram Bot API (`<api_base>/bot<token>/<method>`).
#[derive(Clone)]
pub struct TelegramClient {
    api_base: String,
    token: String,
    client: reqwest::Client,
}

impl TelegramClient {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    /// POST a JSON body to a Bot API method (GET when `body` is None) and unwrap the envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, TelegramError> {
        let url = format!("{}/bot{}/{}", self.api_base, self.token, method);
        let req = match body {
            Some(b) => self.client.post(&url).json(&b),
            None => self.client.get(&url),
        };
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        let envelope: ApiResponse<T> = match serde_json::from_str(&text) {
            Ok(e) => e,
            Err(_) if !status.is_success() => {
                return Err(TelegramError::Api(format!("{} failed: {} {}", method, status, text)));
            }
            Err(e) => {
                return Err(TelegramError::Api(format!("{} returned invalid JSON: {}", method, e)));
            }
        };
        if !envelope.ok {
            let reason = envelope
                .description
                .unwrap_or_else(|| status.to_string());
            return Err(TelegramError::Api(format!("{} failed: {}", method, reason)));
        }
        envelope
            .result
            .ok_or_else(|| TelegramError::Api(format!("{} returned no result", method)))
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<(), TelegramError> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(id) = reply_to {
            body["reply_to_message_id"] = json!(id);
        }
        let _: serde_json::Value = self.call("sendMessage", Some(body)).await?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        reply_to: Option<i64>,
    ) -> Result<(), TelegramError> {
        let mut body = json!({ "chat_id": chat_id, "photo": photo_url });
        if let Some(id) = reply_to {
            body["reply_to_message_id"] = json!(id);
        }
        let _: serde_json::Value = self.call("sendPhoto", Some(body)).await?;
        Ok(())
    }

    async fn set_webhook(&self, url: &str, secret: Option<&str>) -> Result<bool, TelegramError> {
        let mut body = json!({ "url": url });
        if let Some(s) = secret {
            body["secret_token"] = serde_json::Value::String(s.to_string());
        }
        self.call("setWebhook", Some(body)).await
    }

    async fn get_me(&self) -> Result<BotUser, TelegramError> {
        self.call("getMe", None).await
    }
}
