//! Wraps teloxide::Bot and implements [`chanbot_core::Bot`]. Production code sends messages via Telegram; tests can substitute another Bot impl.

use async_trait::async_trait;
use chanbot_core::{Bot as CoreBot, ChanbotError, Chat, LinkButton, Result};
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup};

/// Thin wrapper around teloxide::Bot that implements chanbot-core's Bot trait.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(|e| ChanbotError::Bot(e.to_string()))?;
        Ok(())
    }

    async fn send_message_with_link(&self, chat: &Chat, text: &str, button: &LinkButton) -> Result<()> {
        let url = reqwest::Url::parse(&button.url)
            .map_err(|e| ChanbotError::Bot(format!("invalid button url {}: {}", button.url, e)))?;
        let keyboard =
            InlineKeyboardMarkup::new([[InlineKeyboardButton::url(button.text.clone(), url)]]);
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .reply_markup(keyboard)
            .await
            .map_err(|e| ChanbotError::Bot(e.to_string()))?;
        Ok(())
    }
}
