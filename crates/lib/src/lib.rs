//! Paintbot core library — configuration, Telegram Bot API client, message handler,
//! and the webhook HTTP server used by the CLI.

pub mod config;
pub mod handler;
pub mod server;
pub mod telegram;
