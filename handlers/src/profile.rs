//! `/profile`: the stored user record.

use async_trait::async_trait;
use chanbot_core::{Handler, HandlerResponse, Message, Result};

use crate::command::{self, CommandSpec};
use crate::context::HandlerContext;

pub struct ProfileHandler {
    ctx: HandlerContext,
}

impl ProfileHandler {
    pub const COMMANDS: &'static [CommandSpec] = &[CommandSpec::user("profile", "cmd-profile")];

    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Handler for ProfileHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Some(cmd) = message.command() else {
            return Ok(HandlerResponse::Continue);
        };
        if command::find(Self::COMMANDS, cmd.name).is_none() {
            return Ok(HandlerResponse::Continue);
        }

        let Some(record) = self.ctx.service.get_user(message.user.id).await? else {
            return self.ctx.reply(message, self.ctx.t(message, "profile-not-found")).await;
        };
        let name = message.user.display_name();
        let id = record.id.to_string();
        let admin = self.ctx.yes_no(message, record.is_admin);
        let until = self.ctx.format_time(message, record.subscription_expires_at);
        let referrals = record.referral_count.to_string();
        let text = self.ctx.t_args(
            message,
            "profile-info",
            &[
                ("name", &name),
                ("id", &id),
                ("admin", &admin),
                ("until", &until),
                ("referrals", &referrals),
            ],
        );
        self.ctx.reply(message, text).await
    }
}
