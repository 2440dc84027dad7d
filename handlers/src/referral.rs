//! `/referral`: the user's invitation link and how many users joined through it.

use async_trait::async_trait;
use chanbot_core::{Handler, HandlerResponse, Message, Result};

use crate::command::{self, CommandSpec};
use crate::context::HandlerContext;
use crate::start_help::REFERRAL_PREFIX;

pub struct ReferralHandler {
    ctx: HandlerContext,
}

impl ReferralHandler {
    pub const COMMANDS: &'static [CommandSpec] = &[CommandSpec::user("referral", "cmd-referral")];

    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

/// `https://t.me/<bot>?start=ref_<id>`
pub(crate) fn referral_link(bot_username: &str, user_id: i64) -> String {
    format!(
        "https://t.me/{}?start={}{}",
        bot_username.trim_start_matches('@'),
        REFERRAL_PREFIX,
        user_id
    )
}

#[async_trait]
impl Handler for ReferralHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Some(cmd) = message.command() else {
            return Ok(HandlerResponse::Continue);
        };
        if command::find(Self::COMMANDS, cmd.name).is_none() {
            return Ok(HandlerResponse::Continue);
        }

        let Some(bot_username) = self.ctx.identity.username().await else {
            return self.ctx.reply(message, self.ctx.t(message, "referral-unavailable")).await;
        };
        let count = self
            .ctx
            .service
            .get_user(message.user.id)
            .await?
            .map_or(0, |record| record.referral_count)
            .to_string();
        let link = referral_link(&bot_username, message.user.id);
        let text = self
            .ctx
            .t_args(message, "referral-link", &[("link", &link), ("count", &count)]);
        self.ctx.reply(message, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::referral_link;

    #[test]
    fn test_referral_link() {
        assert_eq!(referral_link("chan_bot", 42), "https://t.me/chan_bot?start=ref_42");
        assert_eq!(referral_link("@chan_bot", 7), "https://t.me/chan_bot?start=ref_7");
    }
}
