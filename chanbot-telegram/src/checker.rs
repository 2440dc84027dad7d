//! Channel membership via `getChatMember`. The bot must be an administrator of the channel.

use async_trait::async_trait;
use chanbot_core::{ChanbotError, MembershipStatus, Result, SubscriptionChecker, SubscriptionStatus};
use teloxide::prelude::*;
use teloxide::types::{ChatMemberKind, Recipient, UserId};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct TelegramSubscriptionChecker {
    bot: teloxide::Bot,
}

impl TelegramSubscriptionChecker {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

fn membership_of(kind: &ChatMemberKind) -> MembershipStatus {
    if kind.is_owner() {
        MembershipStatus::Owner
    } else if kind.is_administrator() {
        MembershipStatus::Administrator
    } else if kind.is_member() {
        MembershipStatus::Member
    } else if kind.is_restricted() {
        MembershipStatus::Restricted
    } else if kind.is_banned() {
        MembershipStatus::Banned
    } else {
        MembershipStatus::Left
    }
}

#[async_trait]
impl SubscriptionChecker for TelegramSubscriptionChecker {
    #[instrument(skip(self))]
    async fn check(&self, channel: &str, user_id: i64) -> Result<SubscriptionStatus> {
        let member = self
            .bot
            .get_chat_member(
                Recipient::ChannelUsername(channel.to_string()),
                UserId(user_id as u64),
            )
            .await
            .map_err(|e| ChanbotError::Subscription(e.to_string()))?;

        let membership = membership_of(&member.kind);
        let is_subscribed = member.is_present();
        debug!(membership = membership.as_str(), is_subscribed, "Membership checked");
        Ok(SubscriptionStatus::new(is_subscribed, membership))
    }
}
