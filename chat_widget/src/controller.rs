//! Widget UI controller: open/close state, input capture, message display.
//!
//! The controller performs no DOM work itself. Every visible effect goes
//! through the [`WidgetSurface`] adapter, and every user gesture arrives as
//! a [`WidgetEvent`], so the binding layer (a page script, a test harness)
//! stays a thin, swappable shell around this type.

use crate::{
    dispatcher::ChatTransport,
    model::{ChatMessage, Conversation, SessionState},
};

/// The binding adapter the controller renders through.
pub trait WidgetSurface {
    fn append_message(&mut self, message: &ChatMessage);
    fn set_typing_visible(&mut self, visible: bool);
    fn set_send_enabled(&mut self, enabled: bool);
    fn set_window_visible(&mut self, visible: bool);
    fn focus_input(&mut self);
    fn clear_input(&mut self);
    fn scroll_to_latest(&mut self);
}

/// Explicit event-to-handler mapping for the binding layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    IconClicked,
    CloseClicked,
    OutsideClicked,
    SendClicked,
    InputChanged(String),
    EnterPressed { shift: bool },
    QuickReplySelected(usize),
}

#[derive(Debug, Clone, Copy)]
pub struct QuickReply {
    pub label: &'static str,
    pub message: &'static str,
}

/// Selecting a quick reply is equivalent to typing its message and
/// submitting it.
pub const QUICK_REPLIES: &[QuickReply] = &[
    QuickReply {
        label: "Available Courses",
        message: "What courses do you offer?",
    },
    QuickReply {
        label: "Pricing",
        message: "How much do courses cost?",
    },
    QuickReply {
        label: "Enrollment",
        message: "How do I enroll?",
    },
    QuickReply {
        label: "Contact Us",
        message: "Contact information",
    },
];

pub struct ChatWidget<S, T> {
    pub(crate) state: SessionState,
    pub(crate) conversation: Conversation,
    pub(crate) input: String,
    pub(crate) token: String,
    pub(crate) surface: S,
    pub(crate) transport: T,
}

impl<S: WidgetSurface, T: ChatTransport> ChatWidget<S, T> {
    /// Builds a closed, idle widget. `token` is the per-render credential
    /// injected by the page bootstrap; it accompanies every send.
    pub fn new(surface: S, transport: T, token: impl Into<String>) -> Self {
        Self {
            state: SessionState::default(),
            conversation: Conversation::default(),
            input: String::new(),
            token: token.into(),
            surface,
            transport,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn is_typing(&self) -> bool {
        self.state.is_typing
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub async fn handle_event(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::IconClicked => self.toggle(),
            WidgetEvent::CloseClicked => self.close(),
            WidgetEvent::OutsideClicked => {
                if self.state.is_open {
                    self.close();
                }
            }
            WidgetEvent::SendClicked => self.submit_current_input().await,
            WidgetEvent::InputChanged(text) => self.input = text,
            WidgetEvent::EnterPressed { shift: false } => self.submit_current_input().await,
            WidgetEvent::EnterPressed { shift: true } => self.input.push('\n'),
            WidgetEvent::QuickReplySelected(index) => {
                if let Some(reply) = QUICK_REPLIES.get(index) {
                    self.input = reply.message.to_owned();
                    self.submit_current_input().await;
                }
            }
        }
    }

    /// Idempotent beyond focusing: reopening an open widget only refocuses
    /// the input.
    pub fn open(&mut self) {
        if !self.state.is_open {
            self.state.is_open = true;
            self.surface.set_window_visible(true);
            self.surface.scroll_to_latest();
        }
        self.surface.focus_input();
    }

    pub fn close(&mut self) {
        if self.state.is_open {
            self.state.is_open = false;
            self.surface.set_window_visible(false);
        }
    }

    pub fn toggle(&mut self) {
        if self.state.is_open {
            self.close();
        } else {
            self.open();
        }
    }

    /// Submits the trimmed input buffer. A no-op while a request is in
    /// flight or when the buffer trims down to nothing.
    pub async fn submit_current_input(&mut self) {
        let message = self.input.trim().to_owned();
        if message.is_empty() || self.state.is_typing {
            return;
        }
        self.input.clear();
        self.surface.clear_input();

        self.append(ChatMessage::user(message.clone()));
        self.dispatch(&message).await;
    }

    pub(crate) fn append(&mut self, message: ChatMessage) {
        self.surface.append_message(&message);
        self.conversation.push(message);
        self.surface.scroll_to_latest();
    }
}
