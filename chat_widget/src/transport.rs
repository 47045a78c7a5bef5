//! Production transport: posts the chat form to the proxy endpoint.

use anyhow::Context;

use crate::{
    dispatcher::ChatTransport,
    wire::{ClientEnvelope, OutgoingRequest},
};

/// Form-urlencoded HTTP client for the proxy's chat endpoint. The endpoint
/// URL is one of the two opaque strings the page bootstrap supplies.
pub struct HttpChatTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpChatTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl ChatTransport for HttpChatTransport {
    async fn send(&self, request: &OutgoingRequest) -> anyhow::Result<ClientEnvelope> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(request)
            .send()
            .await
            .context("chat endpoint unreachable")?
            .error_for_status()
            .context("chat endpoint returned an error status")?;

        response
            .json::<ClientEnvelope>()
            .await
            .context("chat endpoint returned a malformed envelope")
    }
}
