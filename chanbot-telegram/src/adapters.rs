//! Adapters from Telegram (teloxide) types to chanbot_core types.

use chanbot_core::{Chat, Message, ToCoreMessage, User};

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl TelegramUserWrapper<'_> {
    pub fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
            language_code: self.0.language_code.clone(),
        }
    }
}

/// Wraps a teloxide Message for conversion to core [`Message`].
///
/// Messages without a sender (channel posts, anonymous admins) yield `None` and are skipped.
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl ToCoreMessage for TelegramMessageWrapper<'_> {
    fn to_core(&self) -> Option<Message> {
        let msg = self.0;
        let user = msg.from.as_ref().map(|u| TelegramUserWrapper(u).to_core())?;
        Some(Message {
            id: msg.id.to_string(),
            user,
            chat: Chat {
                id: msg.chat.id.0,
                chat_type: self.chat_type().to_string(),
            },
            content: msg.text().or_else(|| msg.caption()).unwrap_or("").to_string(),
            message_type: self.message_type().to_string(),
            created_at: msg.date,
        })
    }
}

impl TelegramMessageWrapper<'_> {
    fn chat_type(&self) -> &'static str {
        let chat = &self.0.chat;
        if chat.is_private() {
            "private"
        } else if chat.is_group() {
            "group"
        } else if chat.is_supergroup() {
            "supergroup"
        } else {
            "channel"
        }
    }

    fn message_type(&self) -> &'static str {
        let msg = self.0;
        if msg.text().is_some() {
            "text"
        } else if msg.photo().is_some() {
            "photo"
        } else if msg.document().is_some() {
            "document"
        } else if msg.video().is_some() {
            "video"
        } else if msg.voice().is_some() {
            "voice"
        } else if msg.sticker().is_some() {
            "sticker"
        } else {
            "other"
        }
    }
}
