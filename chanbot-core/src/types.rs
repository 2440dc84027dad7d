//! Core types: user, chat, message, command, handler response, and the Handler / Middleware traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User identity (id, username, names, client language).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// IETF language tag reported by the client (e.g. `en`, `ar`).
    pub language_code: Option<String>,
}

impl User {
    /// Username with `@`, else first name, else the numeric id.
    pub fn display_name(&self) -> String {
        match (&self.username, &self.first_name) {
            (Some(username), _) => format!("@{}", username),
            (None, Some(first_name)) => first_name.clone(),
            (None, None) => self.id.to_string(),
        }
    }
}

/// Chat (private, group, supergroup or channel) identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chat {
    pub id: i64,
    pub chat_type: String,
}

/// A single inbound message with its sender and chat.
///
/// Messages always carry both an effective user and an effective chat; updates without them are
/// dropped by the transport adapter and never reach the chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user: User,
    pub chat: Chat,
    /// Text or caption; empty for media without caption.
    pub content: String,
    pub message_type: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Parses the content as a bot command (`/name`, `/name@bot`, `/name args`).
    pub fn command(&self) -> Option<Command<'_>> {
        Command::parse(&self.content)
    }

    /// Language used for replies to this message.
    pub fn language(&self) -> Option<&str> {
        self.user.language_code.as_deref()
    }
}

/// A parsed bot command borrowed from message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command<'a> {
    /// Command name without the leading `/` and without the `@bot` suffix.
    pub name: &'a str,
    /// Everything after the command token, trimmed.
    pub args: &'a str,
}

impl<'a> Command<'a> {
    pub fn parse(text: &'a str) -> Option<Self> {
        let text = text.trim_start();
        let rest = text.strip_prefix('/')?;
        let (token, args) = match rest.find(char::is_whitespace) {
            Some(idx) => (&rest[..idx], rest[idx..].trim()),
            None => (rest, ""),
        };
        let name = token.split('@').next().unwrap_or(token);
        if name.is_empty() {
            return None;
        }
        Some(Self { name, args })
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Whitespace-separated arguments.
    pub fn arg_list(&self) -> Vec<&'a str> {
        self.args.split_whitespace().collect()
    }
}

/// Handler result for the chain. `Reply(text)` carries the response body so later hooks can see it in `after()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Stop the chain; no response body.
    Stop,
    /// Stop the handle phase and attach the reply text that was sent.
    Reply(String),
}

/// Converts a transport-specific message type to a core [`Message`].
///
/// Returns `None` when the update lacks an effective user or chat.
pub trait ToCoreMessage: Send + Sync {
    fn to_core(&self) -> Option<Message>;
}

/// Feature handler: optional before / handle / after. The chain runs all before → handle until
/// Stop/Reply → all after (reverse).
#[async_trait]
pub trait Handler: Send + Sync {
    /// Runs before the handle phase. Return false to stop the chain.
    async fn before(&self, _message: &Message) -> crate::error::Result<bool> {
        Ok(true)
    }
    /// Processes the message. Return Stop or Reply to end the handle phase. Default: Continue.
    async fn handle(&self, _message: &Message) -> crate::error::Result<HandlerResponse> {
        Ok(HandlerResponse::Continue)
    }
    /// Runs after the handle phase (reverse order), with the final response.
    async fn after(
        &self,
        _message: &Message,
        _response: &HandlerResponse,
    ) -> crate::error::Result<()> {
        Ok(())
    }
}

/// Middleware wraps the whole handler phase. `before` returning false stops the chain before any handler runs.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn before(&self, message: &Message) -> crate::error::Result<bool>;

    async fn after(
        &self,
        _message: &Message,
        _response: &HandlerResponse,
    ) -> crate::error::Result<()> {
        Ok(())
    }
}
