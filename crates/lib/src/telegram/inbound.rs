//! Inbound message: the request-scoped view of an update that the handler acts on.

use super::update::TelegramUpdate;

/// A text message from a chat. Lives only for the duration of one webhook request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: String,
}

impl InboundMessage {
    /// None when the update has no message or the message has no text.
    pub fn from_update(update: &TelegramUpdate) -> Option<Self> {
        let msg = update.message.as_ref()?;
        let text = msg.text.as_ref()?;
        Some(Self {
            chat_id: msg.chat.id,
            message_id: msg.message_id,
            text: text.clone(),
        })
    }
}
