//! Session-local chat messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// How the widget should render a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Plain text bubble.
    Text,
    /// Suggested question rendered as a button.
    QuickReply,
    /// Contact card (WhatsApp link).
    Contact,
    /// Unanswered query; exposes the "open a ticket" control.
    Ticket,
}

/// A message exchanged in one chat session. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

impl ChatMessage {
    fn new(text: impl Into<String>, sender: Sender, kind: MessageKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
            kind,
        }
    }

    /// A text message typed by the visitor.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User, MessageKind::Text)
    }

    /// A plain text reply from the bot.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot, MessageKind::Text)
    }

    /// A bot message with a specific rendering kind.
    pub fn bot_with_kind(text: impl Into<String>, kind: MessageKind) -> Self {
        Self::new(text, Sender::Bot, kind)
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}
