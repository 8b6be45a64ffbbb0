//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.paintbot/config.json`) and environment,
//! then resolved once at startup into [`Settings`], which is shared read-only by the server.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_AVATAR_BASE_URL: &str = "https://api.adorable.io/avatars";
const WEBHOOK_PATH: &str = "/webhook";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Telegram bot identity and webhook settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Avatar image service used for non-command messages.
    #[serde(default)]
    pub avatar: AvatarConfig,
}

/// Server bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for HTTP (default 5000).
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

fn default_server_port() -> u16 {
    5000
}

fn default_server_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

/// Telegram bot config. Every field is overridden by its environment variable when set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    /// Bot token from BotFather. Overridden by BOT_TOKEN.
    pub token: Option<String>,
    /// Display name shown by the status page. Overridden by BOT_USER_NAME.
    pub user_name: Option<String>,
    /// Externally reachable base URL; the webhook is registered at `<url>/webhook`. Overridden by BOT_URL.
    pub url: Option<String>,
    /// Secret sent with setWebhook and checked on every webhook POST. Overridden by BOT_WEBHOOK_SECRET.
    pub webhook_secret: Option<String>,
    /// Bot API base URL. Overridden by TELEGRAM_API_BASE.
    pub api_base: Option<String>,
}

/// Avatar service: image URL is `<base_url>/<size>/<name>.png`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarConfig {
    #[serde(default = "default_avatar_base_url")]
    pub base_url: String,
    #[serde(default = "default_avatar_size")]
    pub size: u32,
}

fn default_avatar_base_url() -> String {
    DEFAULT_AVATAR_BASE_URL.to_string()
}

fn default_avatar_size() -> u32 {
    285
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            base_url: default_avatar_base_url(),
            size: default_avatar_size(),
        }
    }
}

/// Runtime settings resolved from [`Config`] and environment. Built once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: String,
    /// None until configured or discovered via getMe.
    pub user_name: Option<String>,
    /// Full callback URL passed to setWebhook. None when no base URL is configured.
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub api_base: String,
    pub avatar: AvatarConfig,
}

impl Settings {
    /// Resolve settings from config with environment overrides. Fails when no bot token is available.
    pub fn resolve(config: &Config) -> Result<Self> {
        Self::resolve_with(config, |key| std::env::var(key).ok())
    }

    /// Same as [`Settings::resolve`] with an explicit environment lookup.
    pub fn resolve_with<F>(config: &Config, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot = &config.bot;
        let token = first_non_empty(env("BOT_TOKEN"), bot.token.as_deref())
            .context("bot token not configured (set BOT_TOKEN or bot.token)")?;
        let user_name = first_non_empty(env("BOT_USER_NAME"), bot.user_name.as_deref());
        let webhook_url =
            first_non_empty(env("BOT_URL"), bot.url.as_deref()).map(|u| webhook_url(&u));
        let webhook_secret =
            first_non_empty(env("BOT_WEBHOOK_SECRET"), bot.webhook_secret.as_deref());
        let api_base = first_non_empty(env("TELEGRAM_API_BASE"), bot.api_base.as_deref())
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string());
        Ok(Self {
            token,
            user_name,
            webhook_url,
            webhook_secret,
            api_base,
            avatar: config.avatar.clone(),
        })
    }

    /// Name shown on the status page; "bot" when none is known.
    pub fn display_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or("bot")
    }
}

/// Callback URL for a base URL: trailing slashes are dropped before appending `/webhook`.
pub fn webhook_url(base: &str) -> String {
    format!("{}{}", base.trim().trim_end_matches('/'), WEBHOOK_PATH)
}

/// Env value wins over the configured value; blank values count as unset.
fn first_non_empty(env_value: Option<String>, configured: Option<&str>) -> Option<String> {
    env_value
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            configured
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("PAINTBOT_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".paintbot").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, PAINTBOT_CONFIG_PATH, or the default. Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(default_config_path);
    if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let config = serde_json::from_str(&s)
        .with_context(|| format!("parsing config from {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_server_port_and_bind() {
        let s = ServerConfig::default();
        assert_eq!(s.port, 5000);
        assert_eq!(s.bind, "127.0.0.1");
    }

    #[test]
    fn parses_camel_case_config_with_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"bot": {"token": "abc", "userName": "paintbot", "webhookSecret": "s3"}}"#,
        )
        .unwrap();
        assert_eq!(config.bot.token.as_deref(), Some("abc"));
        assert_eq!(config.bot.user_name.as_deref(), Some("paintbot"));
        assert_eq!(config.bot.webhook_secret.as_deref(), Some("s3"));
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.avatar, AvatarConfig::default());
    }

    #[test]
    fn env_overrides_config_and_blank_env_is_ignored() {
        let mut config = Config::default();
        config.bot.token = Some("from-config".to_string());
        config.bot.user_name = Some("config-name".to_string());

        let env = env_from(&[("BOT_TOKEN", "from-env"), ("BOT_USER_NAME", "  ")]);
        let settings = Settings::resolve_with(&config, env).unwrap();
        assert_eq!(settings.token, "from-env");
        assert_eq!(settings.user_name.as_deref(), Some("config-name"));
    }

    #[test]
    fn missing_token_is_an_error() {
        let config = Config::default();
        let err = Settings::resolve_with(&config, env_from(&[])).unwrap_err();
        assert!(err.to_string().contains("bot token"));
    }

    #[test]
    fn webhook_url_is_built_from_base_url() {
        let env = env_from(&[("BOT_TOKEN", "t"), ("BOT_URL", "https://bot.example.com/")]);
        let settings = Settings::resolve_with(&Config::default(), env).unwrap();
        assert_eq!(
            settings.webhook_url.as_deref(),
            Some("https://bot.example.com/webhook")
        );
        assert_eq!(settings.api_base, "https://api.telegram.org");
    }

    #[test]
    fn display_name_falls_back_when_unset() {
        let settings = Settings::resolve_with(&Config::default(), env_from(&[("BOT_TOKEN", "t")]))
            .unwrap();
        assert!(settings.user_name.is_none());
        assert_eq!(settings.display_name(), "bot");
    }

    #[test]
    fn loopback_binds() {
        assert!(is_loopback_bind("127.0.0.1"));
        assert!(is_loopback_bind(" localhost "));
        assert!(!is_loopback_bind("0.0.0.0"));
    }
}
