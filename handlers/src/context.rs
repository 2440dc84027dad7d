//! Shared capabilities handed to every handler at construction.

use std::sync::Arc;

use chanbot_core::{Bot, HandlerResponse, Localizer, Message, Result};
use chrono::{DateTime, Utc};
use storage::{RequiredChannel, SubscriptionService};
use tokio::sync::RwLock;
use tracing::debug;

use crate::state::FeatureState;

/// The bot's own username, filled in once the transport has called `getMe`.
#[derive(Clone, Default)]
pub struct BotIdentity {
    username: Arc<RwLock<Option<String>>>,
}

impl BotIdentity {
    pub fn new(username: Option<String>) -> Self {
        Self {
            username: Arc::new(RwLock::new(username)),
        }
    }

    pub async fn username(&self) -> Option<String> {
        self.username.read().await.clone()
    }

    pub async fn set_username(&self, username: impl Into<String>) {
        *self.username.write().await = Some(username.into());
    }
}

/// Everything a handler needs: transport, user store, required channel, texts and feature state.
#[derive(Clone)]
pub struct HandlerContext {
    pub bot: Arc<dyn Bot>,
    pub service: Arc<SubscriptionService>,
    pub channel: RequiredChannel,
    pub localizer: Arc<Localizer>,
    pub identity: BotIdentity,
    pub state: FeatureState,
}

impl HandlerContext {
    pub fn new(
        bot: Arc<dyn Bot>,
        service: Arc<SubscriptionService>,
        channel: RequiredChannel,
        localizer: Arc<Localizer>,
        identity: BotIdentity,
    ) -> Self {
        Self {
            bot,
            service,
            channel,
            localizer,
            identity,
            state: FeatureState::default(),
        }
    }

    pub fn t(&self, message: &Message, key: &str) -> String {
        self.localizer.t(key, message.language())
    }

    pub fn t_args(&self, message: &Message, key: &str, args: &[(&str, &str)]) -> String {
        self.localizer.t_args(key, args, message.language())
    }

    /// Localized yes/no.
    pub fn yes_no(&self, message: &Message, value: bool) -> String {
        self.t(message, if value { "yes" } else { "no" })
    }

    /// `2024-05-01 12:00 UTC`, or the localized "none".
    pub fn format_time(&self, message: &Message, time: Option<DateTime<Utc>>) -> String {
        match time {
            Some(time) => time.format("%Y-%m-%d %H:%M UTC").to_string(),
            None => self.t(message, "none"),
        }
    }

    /// Sends `text` to the message's chat and ends the handle phase with it.
    pub async fn reply(&self, message: &Message, text: String) -> Result<HandlerResponse> {
        self.bot.reply_to(message, &text).await?;
        Ok(HandlerResponse::Reply(text))
    }

    /// Returns `Some(refusal)` when the sender is not an admin; the refusal has already been sent.
    pub async fn refuse_non_admin(&self, message: &Message) -> Result<Option<HandlerResponse>> {
        if self.service.is_admin(message.user.id).await? {
            return Ok(None);
        }
        debug!(user_id = message.user.id, "Admin command refused");
        let text = self.t(message, "admin-only");
        self.reply(message, text).await.map(Some)
    }
}
