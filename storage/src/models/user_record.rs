//! User record model for persistence.
//!
//! Maps to the `users` table and is used by UserRepository and SubscriptionService.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub is_admin: bool,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub referred_by: Option<i64>,
    pub referral_count: i64,
    pub joined_at: DateTime<Utc>,
}

impl UserRecord {
    /// New non-admin record without subscription, joined now.
    pub fn new(id: i64, username: Option<String>, first_name: Option<String>) -> Self {
        Self {
            id,
            username,
            first_name,
            is_admin: false,
            subscription_expires_at: None,
            referred_by: None,
            referral_count: 0,
            joined_at: Utc::now(),
        }
    }

    /// Whether the subscription expiry lies after `now`.
    pub fn has_active_subscription(&self, now: DateTime<Utc>) -> bool {
        self.subscription_expires_at.is_some_and(|until| until > now)
    }
}
