//! Message dispatcher: owns the request lifecycle for one outgoing message.
//!
//! At most one request is ever in flight; `is_typing` guards re-entry and is
//! cleared unconditionally once the transport resolves, so the widget can
//! never get stuck with a disabled send control.

use crate::{
    controller::{ChatWidget, WidgetSurface},
    model::ChatMessage,
    wire::{ClientEnvelope, OutgoingRequest},
};

/// Shown when the proxy answers with a failure envelope or a malformed
/// payload.
pub const SERVICE_ERROR_TEXT: &str = "Sorry, I encountered an error. Please try again.";

/// Shown when the proxy cannot be reached at all.
pub const CONNECTION_ERROR_TEXT: &str =
    "Sorry, I'm having trouble connecting. Please check your internet connection.";

/// Network seam between the dispatcher and the proxy endpoint. Production
/// uses [`crate::transport::HttpChatTransport`]; tests script their own.
pub trait ChatTransport {
    async fn send(&self, request: &OutgoingRequest) -> anyhow::Result<ClientEnvelope>;
}

impl<S: WidgetSurface, T: ChatTransport> ChatWidget<S, T> {
    /// Sends one already-trimmed, non-empty message to the proxy and appends
    /// exactly one bot message for it, canned failure text included.
    pub(crate) async fn dispatch(&mut self, message: &str) {
        self.state.is_typing = true;
        self.surface.set_send_enabled(false);
        self.surface.set_typing_visible(true);

        let request = OutgoingRequest::new(message, self.token.clone());
        let reply = match self.transport.send(&request).await {
            Ok(envelope) => match envelope.reply_text() {
                Some(text) => text.to_owned(),
                None => {
                    tracing::warn!(
                        error = envelope.error.as_deref().unwrap_or("<none>"),
                        "chat endpoint reported a failure"
                    );
                    SERVICE_ERROR_TEXT.to_owned()
                }
            },
            Err(err) => {
                tracing::error!("chat endpoint unreachable: {err:#}");
                CONNECTION_ERROR_TEXT.to_owned()
            }
        };

        self.surface.set_typing_visible(false);
        self.append(ChatMessage::bot(reply));

        self.state.is_typing = false;
        self.surface.set_send_enabled(true);
    }
}
