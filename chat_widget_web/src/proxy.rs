//! The proxy endpoint: the sole trust boundary between the widget and the
//! external chatbot service.
//!
//! Every request is answered with exactly one JSON envelope. Validation
//! failures are rejected locally and never reach the upstream service;
//! upstream failures map to fixed, user-safe error strings.

use axum::{extract::State, Form, Json};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};

use chat_widget::wire::{ChatReply, ClientEnvelope, CHAT_ACTION};

use crate::AppState;

pub const TOKEN_REJECTED_ERROR: &str = "Security check failed";
pub const UNKNOWN_ACTION_ERROR: &str = "Unknown action";
pub const EMPTY_MESSAGE_ERROR: &str = "No message provided";
pub const CONNECT_FAILED_ERROR: &str = "Failed to connect to chatbot service";
pub const INVALID_UPSTREAM_ERROR: &str = "Invalid response from chatbot service";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub action: String,
    pub message: String,
    pub nonce: String,
}

#[derive(Debug, Serialize)]
struct UpstreamRequest<'a> {
    message: &'a str,
}

/// Strict schema for the chatbot service's reply. A body missing either
/// field fails closed as [`UpstreamError::InvalidReply`].
#[derive(Debug, Deserialize)]
struct UpstreamReply {
    response: String,
    status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamError {
    Connect,
    InvalidReply,
}

impl UpstreamError {
    fn client_text(self) -> &'static str {
        match self {
            UpstreamError::Connect => CONNECT_FAILED_ERROR,
            UpstreamError::InvalidReply => INVALID_UPSTREAM_ERROR,
        }
    }
}

/// Outbound half of the proxy. One client is built at startup with the
/// configured request timeout and shared across requests.
pub struct UpstreamClient {
    client: reqwest::Client,
    chat_url: String,
}

impl UpstreamClient {
    pub fn new(chat_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, chat_url })
    }

    pub async fn request_reply(&self, message: &str) -> Result<ChatReply, UpstreamError> {
        let response = self
            .client
            .post(&self.chat_url)
            .json(&UpstreamRequest { message })
            .send()
            .await
            .map_err(|err| {
                tracing::error!("chatbot service unreachable: {err}");
                UpstreamError::Connect
            })?;

        let reply = response.json::<UpstreamReply>().await.map_err(|err| {
            tracing::error!("chatbot service sent an invalid reply: {err}");
            UpstreamError::InvalidReply
        })?;

        Ok(ChatReply {
            response: reply.response,
            status: reply.status,
        })
    }
}

pub async fn chat_message(
    State(state): State<Arc<AppState>>,
    Form(request): Form<ChatRequest>,
) -> Json<ClientEnvelope> {
    if !state.tokens.validate(&request.nonce) {
        tracing::warn!("rejected chat message with an invalid token");
        return Json(ClientEnvelope::failure(TOKEN_REJECTED_ERROR));
    }
    if request.action != CHAT_ACTION {
        tracing::warn!(action = %request.action, "rejected chat message with an unknown action");
        return Json(ClientEnvelope::failure(UNKNOWN_ACTION_ERROR));
    }
    let message = request.message.trim();
    if message.is_empty() {
        return Json(ClientEnvelope::failure(EMPTY_MESSAGE_ERROR));
    }

    tracing::info!("forwarding chat message ({} chars)", message.len());
    match state.upstream.request_reply(message).await {
        Ok(reply) => Json(ClientEnvelope::success(reply)),
        Err(err) => Json(ClientEnvelope::failure(err.client_text())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app, token::TokenStore};
    use axum::{routing::post, Router};
    use chat_widget::{ChatMessage, ChatWidget, HttpChatTransport, Sender, WidgetEvent, WidgetSurface};
    use std::{
        net::SocketAddr,
        sync::atomic::{AtomicUsize, Ordering},
    };

    fn proxy_state(upstream_url: String) -> Arc<AppState> {
        Arc::new(AppState {
            tokens: TokenStore::new(Duration::from_secs(60)),
            upstream: UpstreamClient::new(upstream_url, Duration::from_secs(5)).unwrap(),
        })
    }

    async fn spawn_proxy(state: Arc<AppState>) -> SocketAddr {
        let server = axum::Server::bind(&"127.0.0.1:0".parse().unwrap())
            .serve(app(state).into_make_service());
        let addr = server.local_addr();
        tokio::spawn(server);
        addr
    }

    /// Scripted stand-in for the external chatbot service. Counts hits so
    /// tests can assert that rejected requests never go upstream.
    async fn spawn_upstream(reply: serde_json::Value) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let handler_hits = hits.clone();
        let router = Router::new().route(
            "/api/chat",
            post(move || {
                handler_hits.fetch_add(1, Ordering::SeqCst);
                let reply = reply.clone();
                async move { Json(reply) }
            }),
        );
        let server = axum::Server::bind(&"127.0.0.1:0".parse().unwrap())
            .serve(router.into_make_service());
        let addr = server.local_addr();
        tokio::spawn(server);
        (format!("http://{addr}/api/chat"), hits)
    }

    async fn post_chat(
        proxy: SocketAddr,
        action: &str,
        message: &str,
        nonce: &str,
    ) -> ClientEnvelope {
        reqwest::Client::new()
            .post(format!("http://{proxy}/api/chat"))
            .form(&[("action", action), ("message", message), ("nonce", nonce)])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn passes_wellformed_upstream_reply_through_verbatim() {
        let (url, _) = spawn_upstream(serde_json::json!({
            "response": "Hi!",
            "status": "success"
        }))
        .await;
        let state = proxy_state(url);
        let token = state.tokens.issue();
        let proxy = spawn_proxy(state).await;

        let envelope = post_chat(proxy, CHAT_ACTION, "Hello", &token).await;
        assert!(envelope.success);
        let data = envelope.data.unwrap();
        assert_eq!(data.response, "Hi!");
        assert_eq!(data.status, "success");
    }

    #[tokio::test]
    async fn rejects_invalid_token_without_calling_upstream() {
        let (url, hits) = spawn_upstream(serde_json::json!({
            "response": "Hi!",
            "status": "success"
        }))
        .await;
        let proxy = spawn_proxy(proxy_state(url)).await;

        let envelope = post_chat(proxy, CHAT_ACTION, "Hello", "forged-token").await;
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some(TOKEN_REJECTED_ERROR));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejects_unknown_action() {
        let (url, hits) = spawn_upstream(serde_json::json!({})).await;
        let state = proxy_state(url);
        let token = state.tokens.issue();
        let proxy = spawn_proxy(state).await;

        let envelope = post_chat(proxy, "delete_everything", "Hello", &token).await;
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some(UNKNOWN_ACTION_ERROR));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejects_message_that_trims_to_empty() {
        let (url, hits) = spawn_upstream(serde_json::json!({})).await;
        let state = proxy_state(url);
        let token = state.tokens.issue();
        let proxy = spawn_proxy(state).await;

        let envelope = post_chat(proxy, CHAT_ACTION, "   ", &token).await;
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some(EMPTY_MESSAGE_ERROR));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn maps_upstream_reply_missing_fields_to_invalid_response() {
        let (url, _) = spawn_upstream(serde_json::json!({ "message": "wrong shape" })).await;
        let state = proxy_state(url);
        let token = state.tokens.issue();
        let proxy = spawn_proxy(state).await;

        let envelope = post_chat(proxy, CHAT_ACTION, "Hello", &token).await;
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some(INVALID_UPSTREAM_ERROR));
    }

    #[tokio::test]
    async fn maps_unreachable_upstream_to_connect_failure() {
        // Bind then drop a listener so the port is known to be closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let closed = listener.local_addr().unwrap();
        drop(listener);

        let state = proxy_state(format!("http://{closed}/api/chat"));
        let token = state.tokens.issue();
        let proxy = spawn_proxy(state).await;

        let envelope = post_chat(proxy, CHAT_ACTION, "Hello", &token).await;
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some(CONNECT_FAILED_ERROR));
    }

    #[derive(Default)]
    struct NullSurface;

    impl WidgetSurface for NullSurface {
        fn append_message(&mut self, _message: &ChatMessage) {}
        fn set_typing_visible(&mut self, _visible: bool) {}
        fn set_send_enabled(&mut self, _enabled: bool) {}
        fn set_window_visible(&mut self, _visible: bool) {}
        fn focus_input(&mut self) {}
        fn clear_input(&mut self) {}
        fn scroll_to_latest(&mut self) {}
    }

    #[tokio::test]
    async fn widget_round_trips_through_the_real_transport() {
        let (url, _) = spawn_upstream(serde_json::json!({
            "response": "Hi!",
            "status": "success"
        }))
        .await;
        let state = proxy_state(url);
        let token = state.tokens.issue();
        let proxy = spawn_proxy(state).await;

        let transport = HttpChatTransport::new(format!("http://{proxy}/api/chat"));
        let mut widget = ChatWidget::new(NullSurface, transport, token);
        widget.handle_event(WidgetEvent::InputChanged("Hello".to_owned())).await;
        widget.handle_event(WidgetEvent::SendClicked).await;

        let messages = widget.conversation().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].sender(), Sender::Bot);
        assert_eq!(messages[1].content(), "Hi!");
    }
}
