//! Saved post per user: `/post`, `/stop_posting`, `/posting_status`.

use async_trait::async_trait;
use chanbot_core::{Handler, HandlerResponse, Message, Result};
use tracing::info;

use crate::command::{self, CommandSpec};
use crate::context::HandlerContext;

pub struct PostingHandler {
    ctx: HandlerContext,
}

impl PostingHandler {
    pub const COMMANDS: &'static [CommandSpec] = &[
        CommandSpec::user("post", "cmd-post"),
        CommandSpec::user("stop_posting", "cmd-stop-posting"),
        CommandSpec::user("posting_status", "cmd-posting-status"),
    ];

    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    async fn post(&self, message: &Message, text: &str) -> Result<HandlerResponse> {
        if text.is_empty() {
            return self.ctx.reply(message, self.ctx.t(message, "posting-usage")).await;
        }
        let user_id = message.user.id;
        self.ctx.state.posts.set(user_id, text.to_string()).await;
        let groups = self
            .ctx
            .state
            .groups
            .get(user_id)
            .await
            .map_or(0, |groups| groups.len());
        info!(user_id, groups, "Post saved");

        let count = groups.to_string();
        let reply = self.ctx.t_args(message, "posting-saved", &[("count", &count)]);
        self.ctx.reply(message, reply).await
    }

    async fn stop(&self, message: &Message) -> Result<HandlerResponse> {
        self.ctx.state.posts.remove(message.user.id).await;
        self.ctx.reply(message, self.ctx.t(message, "posting-stopped")).await
    }

    async fn status(&self, message: &Message) -> Result<HandlerResponse> {
        let text = match self.ctx.state.posts.get(message.user.id).await {
            Some(post) => self.ctx.t_args(message, "posting-status-active", &[("text", &post)]),
            None => self.ctx.t(message, "posting-status-inactive"),
        };
        self.ctx.reply(message, text).await
    }
}

#[async_trait]
impl Handler for PostingHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Some(cmd) = message.command() else {
            return Ok(HandlerResponse::Continue);
        };
        match command::find(Self::COMMANDS, cmd.name).map(|spec| spec.command) {
            Some("post") => self.post(message, cmd.args).await,
            Some("stop_posting") => self.stop(message).await,
            Some("posting_status") => self.status(message).await,
            _ => Ok(HandlerResponse::Continue),
        }
    }
}
