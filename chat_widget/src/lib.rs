//! Client-side core of the floating chat widget.
//!
//! The widget is split the same way the page is: a [`controller::ChatWidget`]
//! owns the open/typing state and the message list, a dispatcher drives one
//! request at a time through a [`dispatcher::ChatTransport`], and all DOM
//! work happens behind the [`controller::WidgetSurface`] adapter so the core
//! stays headless.

pub mod controller;
pub mod dispatcher;
pub mod model;
pub mod transport;
pub mod wire;

pub use controller::{ChatWidget, WidgetEvent, WidgetSurface, QUICK_REPLIES};
pub use dispatcher::{ChatTransport, CONNECTION_ERROR_TEXT, SERVICE_ERROR_TEXT};
pub use model::{ChatMessage, Conversation, Sender, SessionState};
pub use transport::HttpChatTransport;
pub use wire::{ChatReply, ClientEnvelope, OutgoingRequest, CHAT_ACTION};
