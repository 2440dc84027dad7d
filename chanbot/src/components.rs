//! Component factory: builds BotComponents from config and wires the handler chain. Isolates assembly logic from the lifecycle.

use std::sync::Arc;

use anyhow::{Context, Result};
use chanbot_core::{Bot, Localizer, SubscriptionChecker};
use chanbot_telegram::{TelegramBotAdapter, TelegramSubscriptionChecker};
use handler_chain::HandlerChain;
use handlers::{
    AdminHandler, AuthHandler, AuthOptions, BotIdentity, GroupHandler, HandlerContext,
    MonitoringHandler, PostingHandler, ProfileHandler, ReferralHandler, ResponseHandler,
    SessionHandler, StartHelpHandler, SubscriptionHandler,
};
use middleware::SubscriptionGate;
use storage::{RequiredChannel, SettingsRepository, SqlitePoolManager, SubscriptionService, UserRepository};
use tracing::{error, info, instrument};

use crate::config::BotConfig;

/// Everything the chain and the lifecycle need; produced once by [`build_bot_components`].
#[derive(Clone)]
pub struct BotComponents {
    pub teloxide_bot: teloxide::Bot,
    /// Bot used by the gate and handlers to send messages.
    pub handler_bot: Arc<dyn Bot>,
    pub checker: Arc<dyn SubscriptionChecker>,
    pub service: Arc<SubscriptionService>,
    pub channel: RequiredChannel,
    pub localizer: Arc<Localizer>,
    pub identity: BotIdentity,
    pub auth_options: AuthOptions,
}

/// Creates the data directory, opens the database and builds the Telegram client.
///
/// `handler_bot_override` / `checker_override` replace the Telegram-backed implementations
/// (integration tests drive the chain without network access).
#[instrument(skip_all, fields(data_dir = %config.data_dir.display()))]
pub async fn build_bot_components(
    config: &BotConfig,
    handler_bot_override: Option<Arc<dyn Bot>>,
    checker_override: Option<Arc<dyn SubscriptionChecker>>,
) -> Result<BotComponents> {
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create data directory {}", config.data_dir.display()))?;

    let database_path = config.database_path();
    let pool = SqlitePoolManager::new(&database_path.to_string_lossy())
        .await
        .map_err(|e| {
            error!(error = %e, path = %database_path.display(), "Failed to open database");
            anyhow::anyhow!("Failed to open database: {}", e)
        })?;
    let users = UserRepository::new(pool.clone()).await?;
    let settings = SettingsRepository::new(pool).await?;
    let channel = RequiredChannel::load(settings, config.required_channel.as_deref()).await?;
    let service = Arc::new(SubscriptionService::new(users, config.admin_ids.iter().copied()));

    let localizer = Arc::new(Localizer::new(&config.locale)?);
    let teloxide_bot = config.telegram.build_bot()?;
    let handler_bot = handler_bot_override
        .unwrap_or_else(|| Arc::new(TelegramBotAdapter::new(teloxide_bot.clone())));
    let checker = checker_override
        .unwrap_or_else(|| Arc::new(TelegramSubscriptionChecker::new(teloxide_bot.clone())));

    info!(
        admins = config.admin_ids.len(),
        locale = %config.locale,
        required_channel = ?channel.get(),
        "Bot components built"
    );

    Ok(BotComponents {
        teloxide_bot,
        handler_bot,
        checker,
        service,
        channel,
        localizer,
        identity: BotIdentity::default(),
        auth_options: AuthOptions {
            proxy_configured: config.telegram.proxy.is_some(),
            api_credentials_configured: config.has_api_credentials(),
        },
    })
}

/// Builds the chain: the subscription gate as the only middleware, then the feature handlers in
/// their fixed order with monitoring last.
pub fn build_handler_chain(components: &BotComponents) -> HandlerChain {
    let ctx = HandlerContext::new(
        components.handler_bot.clone(),
        components.service.clone(),
        components.channel.clone(),
        components.localizer.clone(),
        components.identity.clone(),
    );
    let gate = SubscriptionGate::new(
        components.channel.clone(),
        components.service.clone(),
        components.checker.clone(),
        components.handler_bot.clone(),
        components.localizer.clone(),
    );

    HandlerChain::builder()
        .add_middleware("subscription_gate", Arc::new(gate))
        .add_handler("start_help", Arc::new(StartHelpHandler::new(ctx.clone())))
        .add_handler("auth", Arc::new(AuthHandler::new(ctx.clone(), components.auth_options)))
        .add_handler("group", Arc::new(GroupHandler::new(ctx.clone())))
        .add_handler("posting", Arc::new(PostingHandler::new(ctx.clone())))
        .add_handler("response", Arc::new(ResponseHandler::new(ctx.clone())))
        .add_handler("referral", Arc::new(ReferralHandler::new(ctx.clone())))
        .add_handler("session", Arc::new(SessionHandler::new(ctx.clone())))
        .add_handler("profile", Arc::new(ProfileHandler::new(ctx.clone())))
        .add_handler("subscription", Arc::new(SubscriptionHandler::new(ctx.clone())))
        .add_handler("admin", Arc::new(AdminHandler::new(ctx.clone())))
        .add_handler("monitoring", Arc::new(MonitoringHandler::new(ctx)))
        .build()
}
