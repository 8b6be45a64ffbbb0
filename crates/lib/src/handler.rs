//! Message handler: decide a reply for an inbound message and send it.
//!
//! `/start` gets a greeting; anything else is turned into an avatar name and answered
//! with a photo. Outbound failures are logged and swallowed so the webhook always acknowledges.

use crate::config::{AvatarConfig, Settings};
use crate::telegram::{BotApi, InboundMessage, TelegramUpdate};
use regex::Regex;
use std::sync::OnceLock;

/// Command that triggers the greeting.
pub const START_COMMAND: &str = "/start";

pub const GREETING: &str = "Hello. I am Paintbot 9000.";

/// Sent when the avatar photo could not be delivered.
pub const FALLBACK_MESSAGE: &str =
    "There was a problem in the name you used, please enter different name";

/// What to answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Greeting,
    Avatar { url: String },
}

/// What the handler ended up doing for one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No message or no text; nothing was sent.
    Ignored,
    Greeted,
    SentAvatar,
    /// Photo failed and the fallback text went out instead.
    SentFallback,
    /// Every send attempt failed.
    Failed,
}

/// Anything that is not a letter, a number or `_`. Narrower than the regex crate's `\W`:
/// marks and joiners are replaced, non-decimal numbers such as `½` are kept.
fn non_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{N}_]").expect("static regex"))
}

/// Replace every non-word character with `_` ("John Doe!" -> "John_Doe_").
pub fn sanitize_name(text: &str) -> String {
    non_word().replace_all(text, "_").into_owned()
}

/// Avatar image URL for the given text: `<base_url>/<size>/<sanitized>.png`.
pub fn avatar_url(avatar: &AvatarConfig, text: &str) -> String {
    format!(
        "{}/{}/{}.png",
        avatar.base_url.trim_end_matches('/'),
        avatar.size,
        sanitize_name(text)
    )
}

/// True for `/start`, and for `/start@<bot_user_name>`: the group-chat form of the command,
/// where Telegram appends the addressed bot's name. Any other suffix is plain text.
fn is_start_command(text: &str, bot_user_name: Option<&str>) -> bool {
    if text == START_COMMAND {
        return true;
    }
    match (text.strip_prefix(START_COMMAND), bot_user_name) {
        (Some(rest), Some(name)) => rest
            .strip_prefix('@')
            .is_some_and(|mention| mention.eq_ignore_ascii_case(name)),
        _ => false,
    }
}

pub fn decide_reply(text: &str, bot_user_name: Option<&str>, avatar: &AvatarConfig) -> Reply {
    if is_start_command(text, bot_user_name) {
        Reply::Greeting
    } else {
        Reply::Avatar {
            url: avatar_url(avatar, text),
        }
    }
}

/// Handle one webhook update. Every outbound call is awaited; errors never propagate.
pub async fn handle_update(bot: &dyn BotApi, settings: &Settings, update: &TelegramUpdate) -> Outcome {
    let Some(msg) = InboundMessage::from_update(update) else {
        log::debug!("update {}: no text message, ignoring", update.update_id);
        return Outcome::Ignored;
    };
    log::debug!(
        "got chat_id: {}, msg_id: {}, text: {:?}",
        msg.chat_id,
        msg.message_id,
        msg.text
    );

    match decide_reply(&msg.text, settings.user_name.as_deref(), &settings.avatar) {
        Reply::Greeting => {
            match bot
                .send_message(msg.chat_id, GREETING, Some(msg.message_id))
                .await
            {
                Ok(()) => Outcome::Greeted,
                Err(e) => {
                    log::warn!("failed to send greeting to chat {}: {}", msg.chat_id, e);
                    Outcome::Failed
                }
            }
        }
        Reply::Avatar { url } => {
            let Err(e) = bot
                .send_photo(msg.chat_id, &url, Some(msg.message_id))
                .await
            else {
                return Outcome::SentAvatar;
            };
            log::warn!("failed to send avatar {} to chat {}: {}", url, msg.chat_id, e);
            match bot
                .send_message(msg.chat_id, FALLBACK_MESSAGE, Some(msg.message_id))
                .await
            {
                Ok(()) => Outcome::SentFallback,
                Err(e) => {
                    log::warn!("failed to send fallback to chat {}: {}", msg.chat_id, e);
                    Outcome::Failed
                }
            }
        }
    }
}
