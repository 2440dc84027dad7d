//! `/start` (registration and referral payload) and `/help`.

use async_trait::async_trait;
use chanbot_core::{Handler, HandlerResponse, Message, Result};
use tracing::{info, instrument};

use crate::command::{self, command_catalog, CommandSpec};
use crate::context::HandlerContext;

/// Prefix of the `/start` payload carried by referral links.
pub(crate) const REFERRAL_PREFIX: &str = "ref_";

pub struct StartHelpHandler {
    ctx: HandlerContext,
}

impl StartHelpHandler {
    pub const COMMANDS: &'static [CommandSpec] = &[
        CommandSpec::user("start", "cmd-start"),
        CommandSpec::user("help", "cmd-help"),
    ];

    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, message), fields(user_id = message.user.id))]
    async fn start(&self, message: &Message, payload: &str) -> Result<HandlerResponse> {
        let (_, created) = self.ctx.service.register(&message.user).await?;

        let name = message
            .user
            .first_name
            .clone()
            .unwrap_or_else(|| message.user.display_name());
        let mut text = self.ctx.t_args(message, "start-welcome", &[("name", &name)]);

        if let Some(referrer) = parse_referral(payload) {
            if self.ctx.service.record_referral(message.user.id, referrer).await? {
                let referrer = referrer.to_string();
                text.push_str("\n\n");
                text.push_str(&self.ctx.t_args(
                    message,
                    "start-referral-recorded",
                    &[("referrer", &referrer)],
                ));
            }
        }

        info!(created, "Start command handled");
        self.ctx.reply(message, text).await
    }

    async fn help(&self, message: &Message) -> Result<HandlerResponse> {
        let is_admin = self.ctx.service.is_admin(message.user.id).await?;
        let mut text = self.ctx.t(message, "help-header");
        for spec in command_catalog() {
            if spec.admin_only && !is_admin {
                continue;
            }
            text.push_str(&format!(
                "\n/{} - {}",
                spec.command,
                self.ctx.t(message, spec.description_key)
            ));
        }
        self.ctx.reply(message, text).await
    }
}

/// `ref_<id>` → `Some(id)`.
pub(crate) fn parse_referral(payload: &str) -> Option<i64> {
    payload.trim().strip_prefix(REFERRAL_PREFIX)?.parse().ok()
}

#[async_trait]
impl Handler for StartHelpHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Some(cmd) = message.command() else {
            return Ok(HandlerResponse::Continue);
        };
        match command::find(Self::COMMANDS, cmd.name).map(|spec| spec.command) {
            Some("start") => self.start(message, cmd.args).await,
            Some("help") => self.help(message).await,
            _ => Ok(HandlerResponse::Continue),
        }
    }
}
