//! `/subscription` (own status) and `/set_subscription <user_id> <days>` (admin).

use async_trait::async_trait;
use chanbot_core::{Handler, HandlerResponse, Message, Result};
use chrono::Utc;
use tracing::info;

use crate::command::{self, CommandSpec};
use crate::context::HandlerContext;

pub struct SubscriptionHandler {
    ctx: HandlerContext,
}

impl SubscriptionHandler {
    pub const COMMANDS: &'static [CommandSpec] = &[
        CommandSpec::user("subscription", "cmd-subscription"),
        CommandSpec::admin("set_subscription", "cmd-set-subscription"),
    ];

    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    async fn show(&self, message: &Message) -> Result<HandlerResponse> {
        let record = self.ctx.service.get_user(message.user.id).await?;
        let text = match record {
            Some(record) if record.has_active_subscription(Utc::now()) => {
                let until = self.ctx.format_time(message, record.subscription_expires_at);
                self.ctx.t_args(message, "subscription-active", &[("until", &until)])
            }
            _ => self.ctx.t(message, "subscription-inactive"),
        };
        self.ctx.reply(message, text).await
    }

    async fn set(&self, message: &Message, args: &[&str]) -> Result<HandlerResponse> {
        if let Some(refusal) = self.ctx.refuse_non_admin(message).await? {
            return Ok(refusal);
        }
        let parsed = match args {
            [user, days] => user.parse::<i64>().ok().zip(days.parse::<i64>().ok()),
            _ => None,
        };
        let Some((user_id, days)) = parsed.filter(|(_, days)| *days > 0) else {
            return self.ctx.reply(message, self.ctx.t(message, "subscription-usage")).await;
        };

        let record = self.ctx.service.grant_subscription(user_id, days).await?;
        info!(admin_id = message.user.id, user_id, days, "Subscription set");
        let user = user_id.to_string();
        let until = self.ctx.format_time(message, record.subscription_expires_at);
        let text = self
            .ctx
            .t_args(message, "subscription-set", &[("user", &user), ("until", &until)]);
        self.ctx.reply(message, text).await
    }
}

#[async_trait]
impl Handler for SubscriptionHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Some(cmd) = message.command() else {
            return Ok(HandlerResponse::Continue);
        };
        match command::find(Self::COMMANDS, cmd.name).map(|spec| spec.command) {
            Some("subscription") => self.show(message).await,
            Some("set_subscription") => self.set(message, &cmd.arg_list()).await,
            _ => Ok(HandlerResponse::Continue),
        }
    }
}
