//! Session commands: `/login`, `/logout`, `/auth_status`.

use async_trait::async_trait;
use chanbot_core::{Handler, HandlerResponse, Message, Result};
use chrono::Utc;
use tracing::info;

use crate::command::{self, CommandSpec};
use crate::context::HandlerContext;

/// What the process was started with; reported by `/auth_status`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthOptions {
    pub proxy_configured: bool,
    pub api_credentials_configured: bool,
}

pub struct AuthHandler {
    ctx: HandlerContext,
    options: AuthOptions,
}

impl AuthHandler {
    pub const COMMANDS: &'static [CommandSpec] = &[
        CommandSpec::user("login", "cmd-login"),
        CommandSpec::user("logout", "cmd-logout"),
        CommandSpec::user("auth_status", "cmd-auth-status"),
    ];

    pub fn new(ctx: HandlerContext, options: AuthOptions) -> Self {
        Self { ctx, options }
    }

    async fn login(&self, message: &Message) -> Result<HandlerResponse> {
        let sessions = &self.ctx.state.sessions;
        let key = if sessions.contains(message.user.id).await {
            "auth-already-logged-in"
        } else {
            sessions.set(message.user.id, Utc::now()).await;
            info!(user_id = message.user.id, "Session started");
            "auth-login-started"
        };
        self.ctx.reply(message, self.ctx.t(message, key)).await
    }

    async fn logout(&self, message: &Message) -> Result<HandlerResponse> {
        let key = match self.ctx.state.sessions.remove(message.user.id).await {
            Some(_) => {
                info!(user_id = message.user.id, "Session ended");
                "auth-logged-out"
            }
            None => "auth-not-logged-in",
        };
        self.ctx.reply(message, self.ctx.t(message, key)).await
    }

    async fn status(&self, message: &Message) -> Result<HandlerResponse> {
        let since = self.ctx.state.sessions.get(message.user.id).await;
        let status = match since {
            Some(_) => self.ctx.format_time(message, since),
            None => self.ctx.yes_no(message, false),
        };
        let proxy = self.ctx.yes_no(message, self.options.proxy_configured);
        let api = self.ctx.yes_no(message, self.options.api_credentials_configured);
        let text = self.ctx.t_args(
            message,
            "auth-status",
            &[("status", &status), ("proxy", &proxy), ("api", &api)],
        );
        self.ctx.reply(message, text).await
    }
}

#[async_trait]
impl Handler for AuthHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Some(cmd) = message.command() else {
            return Ok(HandlerResponse::Continue);
        };
        match command::find(Self::COMMANDS, cmd.name).map(|spec| spec.command) {
            Some("login") => self.login(message).await,
            Some("logout") => self.logout(message).await,
            Some("auth_status") => self.status(message).await,
            _ => Ok(HandlerResponse::Continue),
        }
    }
}
