//! Shared fixtures: a recording bot, a context over an in-memory database, and message builders.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chanbot_core::{Bot, Chat, LinkButton, Localizer, Message, User};
use chrono::Utc;
use storage::{RequiredChannel, SqlitePoolManager, SubscriptionService, UserRepository};

use crate::{BotIdentity, HandlerContext};

pub const ADMIN_ID: i64 = 1;

#[derive(Default)]
pub struct RecordingBot {
    pub sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingBot {
    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, text)| text.clone()).collect()
    }

    pub fn last(&self) -> String {
        self.texts().pop().unwrap_or_default()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> chanbot_core::Result<()> {
        self.sent.lock().unwrap().push((chat.id, text.to_string()));
        Ok(())
    }

    async fn send_message_with_link(
        &self,
        chat: &Chat,
        text: &str,
        _button: &LinkButton,
    ) -> chanbot_core::Result<()> {
        self.send_message(chat, text).await
    }
}

pub async fn test_context() -> (HandlerContext, Arc<RecordingBot>) {
    let pool = SqlitePoolManager::new("sqlite::memory:").await.unwrap();
    let service = SubscriptionService::new(UserRepository::new(pool).await.unwrap(), [ADMIN_ID]);
    let bot = Arc::new(RecordingBot::default());
    let ctx = HandlerContext::new(
        bot.clone(),
        Arc::new(service),
        RequiredChannel::in_memory(None),
        Arc::new(Localizer::new("en").unwrap()),
        BotIdentity::default(),
    );
    (ctx, bot)
}

pub fn message_from(user_id: i64, content: &str) -> Message {
    Message {
        id: "msg-1".to_string(),
        user: User {
            id: user_id,
            username: Some(format!("user{}", user_id)),
            first_name: Some("Test".to_string()),
            last_name: None,
            language_code: Some("en".to_string()),
        },
        chat: Chat {
            id: user_id,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
        message_type: "text".to_string(),
        created_at: Utc::now(),
    }
}
