use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use std::{net::SocketAddr, sync::Arc, time::Duration};

mod logging;
mod proxy;
mod render;
mod token;

mod env {
    pub const API_PORT: &str = "CHATW_API_PORT";
    pub const CHATBOT_URL: &str = "CHATW_CHATBOT_URL";
    pub const CHATBOT_TIMEOUT_MS: &str = "CHATW_CHATBOT_TIMEOUT_MS";
    pub const TOKEN_TTL_SECS: &str = "CHATW_TOKEN_TTL_SECS";
}

const DEFAULT_CHATBOT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_TOKEN_TTL_SECS: u64 = 43_200;

pub struct AppState {
    tokens: token::TokenStore,
    upstream: proxy::UpstreamClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::configure_logging();

    let app = app(configure_app_state()?);

    let port = std::env::var(env::API_PORT).ok();
    let port = port.and_then(|x| x.parse().ok()).unwrap_or(3000_u16);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(render::widget_page))
        .route(render::CHAT_ENDPOINT, post(proxy::chat_message))
        .nest_service("/scripts", ServeDir::new("public/scripts"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn configure_app_state() -> anyhow::Result<Arc<AppState>> {
    let chatbot_url = std::env::var(env::CHATBOT_URL)
        .with_context(|| format!("the {} environment variable must be set", env::CHATBOT_URL))?;

    let timeout_ms = env_u64(env::CHATBOT_TIMEOUT_MS).unwrap_or(DEFAULT_CHATBOT_TIMEOUT_MS);
    let ttl_secs = env_u64(env::TOKEN_TTL_SECS).unwrap_or(DEFAULT_TOKEN_TTL_SECS);
    tracing::info!("forwarding chat messages to {chatbot_url} (timeout = {timeout_ms}ms)");

    Ok(Arc::new(AppState {
        tokens: token::TokenStore::new(Duration::from_secs(ttl_secs)),
        upstream: proxy::UpstreamClient::new(chatbot_url, Duration::from_millis(timeout_ms))?,
    }))
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|x| x.parse().ok())
}
