mod chat;
mod config;
mod errors;
mod llm_client;
mod middleware;
mod models;
mod notify;
mod persona;
mod routes;
mod state;
mod tools;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chat::ConversationDriver;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::middleware::rate_limit::{RateLimiter, CHAT_REQUESTS_PER_MINUTE};
use crate::notify::PushoverClient;
use crate::persona::load_persona;
use crate::routes::build_router;
use crate::state::AppState;
use crate::tools::ToolRegistry;

const RATE_LIMIT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Persona API v{}", env!("CARGO_PKG_VERSION"));

    // Read the persona artifacts once; never re-read
    let persona = load_persona(
        &config.persona_name,
        &config.resume_pdf_path,
        &config.summary_path,
    )?;

    let notifier = Arc::new(PushoverClient::new(
        config.pushover_token.clone(),
        config.pushover_user.clone(),
    ));
    let tools = ToolRegistry::standard(notifier);
    info!("Tool registry initialized ({} tools)", tools.schemas().len());

    let llm = LlmClient::new(config.openai_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let driver = ConversationDriver::new(Arc::new(persona), Arc::new(tools), Arc::new(llm));

    let chat_limiter = RateLimiter::per_minute(CHAT_REQUESTS_PER_MINUTE);
    spawn_limiter_sweep(chat_limiter.clone());

    info!(
        "Environment: {} (HTTPS redirect {})",
        config.environment,
        if config.is_production() { "on" } else { "off" }
    );

    // Build app state
    let state = AppState {
        driver,
        config: config.clone(),
        chat_limiter,
    };

    // Build router
    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Periodically drops expired rate-limit windows so the table tracks only
/// recently active clients.
fn spawn_limiter_sweep(limiter: RateLimiter) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            limiter.sweep();
        }
    });
}
