//! Admin commands: required channel and user management.
//!
//! All of these are in the subscription gate's bypass list, so an admin who is not subscribed to
//! the channel can still reach them; the admin check happens here instead.

use async_trait::async_trait;
use chanbot_core::{Handler, HandlerResponse, Message, Result};
use storage::StorageError;
use tracing::{info, instrument, warn};

use crate::command::{self, CommandSpec};
use crate::context::HandlerContext;

/// Default subscription length for `/adduser <id>` without days.
const DEFAULT_SUBSCRIPTION_DAYS: i64 = 30;

pub struct AdminHandler {
    ctx: HandlerContext,
}

impl AdminHandler {
    pub const COMMANDS: &'static [CommandSpec] = &[
        CommandSpec::admin("setchannel", "cmd-setchannel"),
        CommandSpec::admin("channel_subscription", "cmd-channel-subscription"),
        CommandSpec::admin("adduser", "cmd-adduser"),
        CommandSpec::admin("removeuser", "cmd-removeuser"),
        CommandSpec::admin("checkuser", "cmd-checkuser"),
        CommandSpec::admin("listusers", "cmd-listusers"),
    ];

    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    /// `off` clears the channel; anything else is normalized and stored.
    #[instrument(skip(self, message), fields(admin_id = message.user.id))]
    async fn set_channel(&self, message: &Message, arg: &str) -> Result<HandlerResponse> {
        let target = (!arg.eq_ignore_ascii_case("off")).then_some(arg);
        let text = match self.ctx.channel.set(target).await {
            Ok(Some(channel)) => {
                self.ctx
                    .t_args(message, "admin-channel-set", &[("channel", &channel)])
            }
            Ok(None) => self.ctx.t(message, "admin-channel-cleared"),
            Err(StorageError::InvalidChannel(input)) => {
                warn!(input = %input, "Rejected channel");
                self.ctx
                    .t_args(message, "admin-channel-invalid", &[("channel", &input)])
            }
            Err(e) => return Err(e.into()),
        };
        self.ctx.reply(message, text).await
    }

    async fn show_channel(&self, message: &Message) -> Result<HandlerResponse> {
        let text = match self.ctx.channel.get() {
            Some(channel) => {
                self.ctx
                    .t_args(message, "admin-channel-status", &[("channel", &channel)])
            }
            None => self.ctx.t(message, "admin-channel-none"),
        };
        self.ctx.reply(message, text).await
    }

    async fn add_user(&self, message: &Message, args: &[&str]) -> Result<HandlerResponse> {
        let parsed = match args {
            [user] => user.parse::<i64>().ok().map(|id| (id, DEFAULT_SUBSCRIPTION_DAYS)),
            [user, days] => user.parse::<i64>().ok().zip(days.parse::<i64>().ok()),
            _ => None,
        };
        let Some((user_id, days)) = parsed.filter(|(_, days)| *days > 0) else {
            return self.ctx.reply(message, self.ctx.t(message, "admin-adduser-usage")).await;
        };

        let record = self.ctx.service.grant_subscription(user_id, days).await?;
        info!(admin_id = message.user.id, user_id, days, "User added");
        let user = user_id.to_string();
        let until = self.ctx.format_time(message, record.subscription_expires_at);
        let text = self
            .ctx
            .t_args(message, "admin-user-added", &[("user", &user), ("until", &until)]);
        self.ctx.reply(message, text).await
    }

    async fn remove_user(&self, message: &Message, user_id: i64) -> Result<HandlerResponse> {
        let user = user_id.to_string();
        let key = if self.ctx.service.remove_user(user_id).await? {
            info!(admin_id = message.user.id, user_id, "User removed by admin");
            "admin-user-removed"
        } else {
            "admin-user-not-found"
        };
        let text = self.ctx.t_args(message, key, &[("user", &user)]);
        self.ctx.reply(message, text).await
    }

    async fn check_user(&self, message: &Message, user_id: i64) -> Result<HandlerResponse> {
        let user = user_id.to_string();
        let Some(record) = self.ctx.service.get_user(user_id).await? else {
            let text = self.ctx.t_args(message, "admin-user-not-found", &[("user", &user)]);
            return self.ctx.reply(message, text).await;
        };
        let username = record
            .username
            .as_deref()
            .map(|name| format!("@{}", name))
            .unwrap_or_else(|| self.ctx.t(message, "none"));
        let admin = self.ctx.yes_no(message, record.is_admin);
        let until = self.ctx.format_time(message, record.subscription_expires_at);
        let joined = self.ctx.format_time(message, Some(record.joined_at));
        let text = self.ctx.t_args(
            message,
            "admin-user-info",
            &[
                ("user", &user),
                ("username", &username),
                ("admin", &admin),
                ("until", &until),
                ("joined", &joined),
            ],
        );
        self.ctx.reply(message, text).await
    }

    async fn list_users(&self, message: &Message) -> Result<HandlerResponse> {
        let users = self.ctx.service.list_users().await?;
        if users.is_empty() {
            return self.ctx.reply(message, self.ctx.t(message, "admin-users-empty")).await;
        }
        let count = users.len().to_string();
        let mut text = self.ctx.t_args(message, "admin-users-header", &[("count", &count)]);
        for record in users {
            let name = record
                .username
                .map(|name| format!("@{}", name))
                .or(record.first_name)
                .unwrap_or_default();
            let until = self.ctx.format_time(message, record.subscription_expires_at);
            text.push_str(&format!("\n• {} {} ({})", record.id, name, until));
        }
        self.ctx.reply(message, text).await
    }
}

#[async_trait]
impl Handler for AdminHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Some(cmd) = message.command() else {
            return Ok(HandlerResponse::Continue);
        };
        let Some(spec) = command::find(Self::COMMANDS, cmd.name) else {
            return Ok(HandlerResponse::Continue);
        };
        if let Some(refusal) = self.ctx.refuse_non_admin(message).await? {
            return Ok(refusal);
        }

        match spec.command {
            "setchannel" if cmd.args.is_empty() => {
                self.ctx
                    .reply(message, self.ctx.t(message, "admin-setchannel-usage"))
                    .await
            }
            "setchannel" => self.set_channel(message, cmd.args).await,
            "channel_subscription" if cmd.args.is_empty() => self.show_channel(message).await,
            "channel_subscription" => self.set_channel(message, cmd.args).await,
            "adduser" => self.add_user(message, &cmd.arg_list()).await,
            "listusers" => self.list_users(message).await,
            command => {
                let Ok(user_id) = cmd.args.parse::<i64>() else {
                    let text = self
                        .ctx
                        .t_args(message, "admin-user-usage", &[("command", command)]);
                    return self.ctx.reply(message, text).await;
                };
                if command == "removeuser" {
                    self.remove_user(message, user_id).await
                } else {
                    self.check_user(message, user_id).await
                }
            }
        }
    }
}
