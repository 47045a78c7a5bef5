//! Wire schema shared by the widget client and the proxy endpoint.
//!
//! The envelope is validated strictly at the boundary: a reply only counts
//! as renderable when the envelope reports success *and* carries a payload
//! whose status is `"success"`. Anything else fails closed.

use serde::{Deserialize, Serialize};

/// Fixed constant identifying the chat operation on the proxy endpoint.
pub const CHAT_ACTION: &str = "chat_message";

/// One user message on its way to the proxy. Built per send, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutgoingRequest {
    pub action: String,
    pub message: String,
    pub nonce: String,
}

impl OutgoingRequest {
    pub fn new(message: impl Into<String>, nonce: impl Into<String>) -> Self {
        Self {
            action: CHAT_ACTION.to_owned(),
            message: message.into(),
            nonce: nonce.into(),
        }
    }
}

/// Payload the proxy passes through verbatim from the chatbot service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub status: String,
}

pub const REPLY_STATUS_SUCCESS: &str = "success";

/// The single JSON envelope the proxy returns for every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ChatReply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClientEnvelope {
    pub fn success(reply: ChatReply) -> Self {
        Self {
            success: true,
            data: Some(reply),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Returns the renderable reply text, or `None` when the envelope is a
    /// failure, is missing its payload, or reports a non-success status.
    pub fn reply_text(&self) -> Option<&str> {
        if !self.success {
            return None;
        }
        match &self.data {
            Some(reply) if reply.status == REPLY_STATUS_SUCCESS => Some(&reply.response),
            _ => None,
        }
    }
}
