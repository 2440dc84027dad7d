//! `/sessions`: summary of the user's session and feature state.

use async_trait::async_trait;
use chanbot_core::{Handler, HandlerResponse, Message, Result};

use crate::command::{self, CommandSpec};
use crate::context::HandlerContext;

pub struct SessionHandler {
    ctx: HandlerContext,
}

impl SessionHandler {
    pub const COMMANDS: &'static [CommandSpec] = &[CommandSpec::user("sessions", "cmd-sessions")];

    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Handler for SessionHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Some(cmd) = message.command() else {
            return Ok(HandlerResponse::Continue);
        };
        if command::find(Self::COMMANDS, cmd.name).is_none() {
            return Ok(HandlerResponse::Continue);
        }

        let state = &self.ctx.state;
        let user_id = message.user.id;
        let auth = self.ctx.yes_no(message, state.sessions.contains(user_id).await);
        let groups = state
            .groups
            .get(user_id)
            .await
            .map_or(0, |groups| groups.len())
            .to_string();
        let posting = self.ctx.yes_no(message, state.posts.contains(user_id).await);
        let auto_reply = self.ctx.yes_no(message, state.auto_replies.contains(user_id).await);

        let text = self.ctx.t_args(
            message,
            "session-status",
            &[
                ("auth", &auth),
                ("groups", &groups),
                ("posting", &posting),
                ("auto_reply", &auto_reply),
            ],
        );
        self.ctx.reply(message, text).await
    }
}
