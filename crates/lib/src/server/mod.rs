//! HTTP server: status page, webhook registration trigger, and the inbound webhook.
//!
//! Single port, plain HTTP; TLS is expected to be terminated by whatever makes
//! the configured base URL reachable from Telegram.

mod routes;
mod run;

pub use routes::{build_router, register_webhook, AppState, SECRET_TOKEN_HEADER};
pub use run::run_server;
