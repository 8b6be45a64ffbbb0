//! Telegram Bot API: webhook update payloads and the outbound client.
//!
//! [`BotApi`] is the seam between the handler and the platform; [`TelegramClient`]
//! implements it over HTTPS with reqwest.

mod client;
mod inbound;
mod update;

pub use client::{BotApi, BotUser, TelegramClient, TelegramError};
pub use inbound::InboundMessage;
pub use update::{TelegramChat, TelegramMessage, TelegramUpdate};
