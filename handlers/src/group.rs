//! Target groups for posting: `/add_group`, `/remove_group`, `/groups`.

use async_trait::async_trait;
use chanbot_core::{Handler, HandlerResponse, Message, Result};

use crate::command::{self, CommandSpec};
use crate::context::HandlerContext;

pub struct GroupHandler {
    ctx: HandlerContext,
}

impl GroupHandler {
    pub const COMMANDS: &'static [CommandSpec] = &[
        CommandSpec::user("add_group", "cmd-add-group"),
        CommandSpec::user("remove_group", "cmd-remove-group"),
        CommandSpec::user("groups", "cmd-groups"),
    ];

    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    async fn add(&self, message: &Message, group: i64) -> Result<HandlerResponse> {
        let added = self
            .ctx
            .state
            .groups
            .update(message.user.id, |groups| groups.insert(group))
            .await;
        let key = if added { "group-added" } else { "group-exists" };
        let group = group.to_string();
        let text = self.ctx.t_args(message, key, &[("group", &group)]);
        self.ctx.reply(message, text).await
    }

    async fn remove(&self, message: &Message, group: i64) -> Result<HandlerResponse> {
        let removed = self
            .ctx
            .state
            .groups
            .update(message.user.id, |groups| groups.remove(&group))
            .await;
        let key = if removed { "group-removed" } else { "group-not-found" };
        let group = group.to_string();
        let text = self.ctx.t_args(message, key, &[("group", &group)]);
        self.ctx.reply(message, text).await
    }

    async fn list(&self, message: &Message) -> Result<HandlerResponse> {
        let groups = self
            .ctx
            .state
            .groups
            .get(message.user.id)
            .await
            .unwrap_or_default();
        if groups.is_empty() {
            return self.ctx.reply(message, self.ctx.t(message, "group-list-empty")).await;
        }
        let count = groups.len().to_string();
        let mut text = self.ctx.t_args(message, "group-list-header", &[("count", &count)]);
        for group in groups {
            text.push_str(&format!("\n• {}", group));
        }
        self.ctx.reply(message, text).await
    }
}

#[async_trait]
impl Handler for GroupHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Some(cmd) = message.command() else {
            return Ok(HandlerResponse::Continue);
        };
        let Some(spec) = command::find(Self::COMMANDS, cmd.name) else {
            return Ok(HandlerResponse::Continue);
        };
        if spec.command == "groups" {
            return self.list(message).await;
        }

        let Ok(group) = cmd.args.parse::<i64>() else {
            return self.ctx.reply(message, self.ctx.t(message, "group-usage")).await;
        };
        if spec.command == "add_group" {
            self.add(message, group).await
        } else {
            self.remove(message, group).await
        }
    }
}
