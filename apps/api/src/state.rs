use crate::chat::ConversationDriver;
use crate::config::Config;
use crate::middleware::rate_limit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is read-only after startup apart from the rate-limit table.
#[derive(Clone)]
pub struct AppState {
    pub driver: ConversationDriver,
    pub config: Config,
    pub chat_limiter: RateLimiter,
}
