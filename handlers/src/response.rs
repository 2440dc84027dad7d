//! Automatic replies: `/auto_reply <text>`, `/auto_reply_off`.
//!
//! While a user has an automatic reply set, their plain (non-command) messages are answered with it.

use async_trait::async_trait;
use chanbot_core::{Handler, HandlerResponse, Message, Result};
use tracing::debug;

use crate::command::{self, CommandSpec};
use crate::context::HandlerContext;

pub struct ResponseHandler {
    ctx: HandlerContext,
}

impl ResponseHandler {
    pub const COMMANDS: &'static [CommandSpec] = &[
        CommandSpec::user("auto_reply", "cmd-auto-reply"),
        CommandSpec::user("auto_reply_off", "cmd-auto-reply-off"),
    ];

    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    async fn auto_reply(&self, message: &Message) -> Result<HandlerResponse> {
        if message.content.trim().is_empty() {
            return Ok(HandlerResponse::Continue);
        }
        match self.ctx.state.auto_replies.get(message.user.id).await {
            Some(text) => {
                debug!(user_id = message.user.id, "Sending automatic reply");
                self.ctx.reply(message, text).await
            }
            None => Ok(HandlerResponse::Continue),
        }
    }
}

#[async_trait]
impl Handler for ResponseHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Some(cmd) = message.command() else {
            return self.auto_reply(message).await;
        };
        match command::find(Self::COMMANDS, cmd.name).map(|spec| spec.command) {
            Some("auto_reply") if cmd.args.is_empty() => {
                self.ctx.reply(message, self.ctx.t(message, "response-usage")).await
            }
            Some("auto_reply") => {
                self.ctx
                    .state
                    .auto_replies
                    .set(message.user.id, cmd.args.to_string())
                    .await;
                self.ctx.reply(message, self.ctx.t(message, "response-set")).await
            }
            Some("auto_reply_off") => {
                self.ctx.state.auto_replies.remove(message.user.id).await;
                self.ctx.reply(message, self.ctx.t(message, "response-off")).await
            }
            _ => Ok(HandlerResponse::Continue),
        }
    }
}
