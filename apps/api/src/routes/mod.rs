pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};

use crate::chat::handlers::{handle_chat, MAX_BODY_BYTES};
use crate::middleware::{
    cors_layer,
    hosts::{enforce_trusted_host, TrustedHosts},
    https::redirect_to_https,
    rate_limit::rate_limit,
    security_header_layers,
};
use crate::state::AppState;

/// Layers, outermost first: security headers, HTTPS redirect (production
/// only), trusted hosts, CORS. The rate limit wraps `/chat` alone.
pub fn build_router(state: AppState) -> Router {
    let chat = Router::new()
        .route("/chat", post(handle_chat))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .route_layer(from_fn_with_state(state.chat_limiter.clone(), rate_limit));

    let trusted_hosts = TrustedHosts::new(&state.config.allowed_hosts);
    let cors = cors_layer(&state.config.allowed_origins);
    let production = state.config.is_production();

    let mut router = Router::new()
        .route("/health", get(health::health_handler))
        .merge(chat)
        .with_state(state)
        .layer(cors)
        .layer(from_fn_with_state(trusted_hosts, enforce_trusted_host));

    if production {
        router = router.layer(from_fn(redirect_to_https));
    }

    for layer in security_header_layers() {
        router = router.layer(layer);
    }

    router
}
