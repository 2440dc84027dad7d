//! Subscription service: the single shared view of users, admins and subscriptions.
//!
//! Constructed once and handed to the subscription gate and every handler that needs user data.

use std::collections::HashSet;

use chanbot_core::User;
use chrono::{Duration, Utc};
use tracing::{info, instrument};

use crate::error::StorageError;
use crate::models::UserRecord;
use crate::repository::Repository;
use crate::user_repo::UserRepository;

pub struct SubscriptionService {
    users: UserRepository,
    admin_ids: HashSet<i64>,
}

impl SubscriptionService {
    /// `admin_ids` are always treated as admins, in addition to records flagged `is_admin`.
    pub fn new(users: UserRepository, admin_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            users,
            admin_ids: admin_ids.into_iter().collect(),
        }
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>, StorageError> {
        let mut record = self.users.find_by_id(user_id).await?;
        if let Some(record) = record.as_mut() {
            record.is_admin |= self.admin_ids.contains(&user_id);
        }
        Ok(record)
    }

    pub async fn is_admin(&self, user_id: i64) -> Result<bool, StorageError> {
        if self.admin_ids.contains(&user_id) {
            return Ok(true);
        }
        Ok(self
            .users
            .find_by_id(user_id)
            .await?
            .is_some_and(|record| record.is_admin))
    }

    /// Creates the record on first contact or refreshes username/first name. Returns the record
    /// and whether it was newly created.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn register(&self, user: &User) -> Result<(UserRecord, bool), StorageError> {
        let (mut record, created) = match self.users.find_by_id(user.id).await? {
            Some(mut existing) => {
                existing.username = user.username.clone();
                existing.first_name = user.first_name.clone();
                (existing, false)
            }
            None => (
                UserRecord::new(user.id, user.username.clone(), user.first_name.clone()),
                true,
            ),
        };
        self.users.save(&record).await?;
        if created {
            info!("New user registered");
        }
        record.is_admin |= self.admin_ids.contains(&user.id);
        Ok((record, created))
    }

    /// Links `user_id` to `referrer_id` once. Ignored for self-referrals, unknown referrers and
    /// users that already have a referrer. Returns whether the referral was recorded.
    #[instrument(skip(self))]
    pub async fn record_referral(&self, user_id: i64, referrer_id: i64) -> Result<bool, StorageError> {
        if user_id == referrer_id {
            return Ok(false);
        }
        let Some(mut user) = self.users.find_by_id(user_id).await? else {
            return Err(StorageError::NotFound(format!("user {}", user_id)));
        };
        if user.referred_by.is_some() {
            return Ok(false);
        }
        let Some(mut referrer) = self.users.find_by_id(referrer_id).await? else {
            return Ok(false);
        };

        user.referred_by = Some(referrer_id);
        referrer.referral_count += 1;
        self.users.save(&user).await?;
        self.users.save(&referrer).await?;
        info!(referral_count = referrer.referral_count, "Referral recorded");
        Ok(true)
    }

    /// Sets the subscription to expire `days` from now, creating the user if unknown.
    #[instrument(skip(self))]
    pub async fn grant_subscription(&self, user_id: i64, days: i64) -> Result<UserRecord, StorageError> {
        let mut record = self
            .users
            .find_by_id(user_id)
            .await?
            .unwrap_or_else(|| UserRecord::new(user_id, None, None));
        record.subscription_expires_at = Some(Utc::now() + Duration::days(days));
        self.users.save(&record).await?;
        info!(until = ?record.subscription_expires_at, "Subscription granted");
        record.is_admin |= self.admin_ids.contains(&user_id);
        Ok(record)
    }

    pub async fn remove_user(&self, user_id: i64) -> Result<bool, StorageError> {
        let removed = self.users.delete(user_id).await?;
        if removed {
            info!(user_id, "User removed");
        }
        Ok(removed)
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, StorageError> {
        let mut users = self.users.find_all().await?;
        for record in users.iter_mut() {
            record.is_admin |= self.admin_ids.contains(&record.id);
        }
        Ok(users)
    }

    pub async fn user_count(&self) -> Result<i64, StorageError> {
        self.users.count().await
    }
}
