//! Channel membership lookup used by the subscription gate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Membership of a user in a channel as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Administrator => "administrator",
            Self::Member => "member",
            Self::Restricted => "restricted",
            Self::Left => "left",
            Self::Banned => "banned",
        }
    }
}

/// Result of a subscription check: the boolean verdict plus the raw membership metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionStatus {
    pub is_subscribed: bool,
    pub membership: MembershipStatus,
}

impl SubscriptionStatus {
    pub fn new(is_subscribed: bool, membership: MembershipStatus) -> Self {
        Self {
            is_subscribed,
            membership,
        }
    }
}

/// Determines whether a user is subscribed to a channel.
#[async_trait]
pub trait SubscriptionChecker: Send + Sync {
    /// `channel` is the normalized handle (`@name`).
    async fn check(&self, channel: &str, user_id: i64) -> Result<SubscriptionStatus>;
}
