//! Channel subscription gate.
//!
//! Decision table, evaluated in order:
//!
//! | condition                                   | decision |
//! |---------------------------------------------|----------|
//! | text message starts with an admin command    | allow    |
//! | no required channel configured               | allow    |
//! | sender is an admin                           | allow    |
//! | sender is subscribed to the channel          | allow    |
//! | otherwise                                    | deny: send prompt with join button, stop chain |

use std::sync::Arc;

use async_trait::async_trait;
use chanbot_core::{Bot, LinkButton, Localizer, Message, Middleware, Result, SubscriptionChecker};
use storage::{channel_link, RequiredChannel, SubscriptionService};
use tracing::{error, info, instrument, warn};

/// Commands that stay reachable while the gate blocks everyone else, so admins can always
/// reconfigure or disable it.
pub const ADMIN_COMMAND_PREFIXES: &[&str] = &[
    "/channel_subscription",
    "/set_subscription",
    "/setchannel",
    "/adduser",
    "/removeuser",
    "/checkuser",
    "/listusers",
];

/// Only the text of a text message counts; captions never bypass the gate.
fn is_admin_command(message: &Message) -> bool {
    message.message_type == "text"
        && ADMIN_COMMAND_PREFIXES
            .iter()
            .any(|prefix| message.content.starts_with(prefix))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    AdminCommand,
    NoChannelRequired,
    Admin,
    Subscribed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow(AllowReason),
    Deny { channel: String },
}

pub struct SubscriptionGate {
    channel: RequiredChannel,
    service: Arc<SubscriptionService>,
    checker: Arc<dyn SubscriptionChecker>,
    bot: Arc<dyn Bot>,
    localizer: Arc<Localizer>,
}

impl SubscriptionGate {
    pub fn new(
        channel: RequiredChannel,
        service: Arc<SubscriptionService>,
        checker: Arc<dyn SubscriptionChecker>,
        bot: Arc<dyn Bot>,
        localizer: Arc<Localizer>,
    ) -> Self {
        Self {
            channel,
            service,
            checker,
            bot,
            localizer,
        }
    }

    /// Evaluates the decision table for one message without side effects.
    pub async fn decide(&self, message: &Message) -> GateDecision {
        if is_admin_command(message) {
            return GateDecision::Allow(AllowReason::AdminCommand);
        }

        let Some(channel) = self.channel.get() else {
            return GateDecision::Allow(AllowReason::NoChannelRequired);
        };

        let user_id = message.user.id;
        match self.service.is_admin(user_id).await {
            Ok(true) => return GateDecision::Allow(AllowReason::Admin),
            Ok(false) => {}
            Err(e) => warn!(error = %e, user_id, "Admin lookup failed; treating user as non-admin"),
        }

        match self.checker.check(&channel, user_id).await {
            Ok(status) if status.is_subscribed => GateDecision::Allow(AllowReason::Subscribed),
            Ok(status) => {
                info!(user_id, channel = %channel, membership = status.membership.as_str(), "User not subscribed");
                GateDecision::Deny { channel }
            }
            Err(e) => {
                warn!(error = %e, user_id, channel = %channel, "Subscription check failed; denying");
                GateDecision::Deny { channel }
            }
        }
    }

    async fn send_prompt(&self, message: &Message, channel: &str) -> Result<()> {
        let lang = message.language();
        let text = self
            .localizer
            .t_args("gate-subscribe-required", &[("channel", channel)], lang);
        let button = LinkButton::new(self.localizer.t("gate-subscribe-button", lang), channel_link(channel));
        self.bot.send_message_with_link(&message.chat, &text, &button).await
    }
}

#[async_trait]
impl Middleware for SubscriptionGate {
    #[instrument(skip(self, message), fields(user_id = message.user.id, chat_id = message.chat.id))]
    async fn before(&self, message: &Message) -> Result<bool> {
        match self.decide(message).await {
            GateDecision::Allow(reason) => {
                tracing::debug!(reason = ?reason, "Gate allowed message");
                Ok(true)
            }
            GateDecision::Deny { channel } => {
                if let Err(e) = self.send_prompt(message, &channel).await {
                    error!(error = %e, "Failed to send subscription prompt");
                }
                Ok(false)
            }
        }
    }
}
