//! Bot abstraction for sending messages.
//!
//! [`Bot`] is transport-agnostic; the teloxide implementation lives in chanbot-telegram.

use crate::error::Result;
use crate::types::{Chat, Message};
use async_trait::async_trait;

/// Inline button that opens a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkButton {
    pub text: String,
    pub url: String,
}

impl LinkButton {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// Abstraction for sending messages. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;

    /// Sends a text message with a single inline URL button underneath.
    async fn send_message_with_link(&self, chat: &Chat, text: &str, button: &LinkButton)
        -> Result<()>;

    /// Sends a reply to the given message (same chat).
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.send_message(&message.chat, text).await
    }
}
