//! Per-user feature state kept in memory for the lifetime of the process.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Map from user id to a value, shared between clones.
pub struct UserState<T> {
    inner: Arc<RwLock<HashMap<i64, T>>>,
}

impl<T> Clone for UserState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for UserState<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<T: Clone + Send + Sync> UserState<T> {
    pub async fn get(&self, user_id: i64) -> Option<T> {
        self.inner.read().await.get(&user_id).cloned()
    }

    pub async fn contains(&self, user_id: i64) -> bool {
        self.inner.read().await.contains_key(&user_id)
    }

    /// Stores `value`, returning the previous one.
    pub async fn set(&self, user_id: i64, value: T) -> Option<T> {
        self.inner.write().await.insert(user_id, value)
    }

    pub async fn remove(&self, user_id: i64) -> Option<T> {
        self.inner.write().await.remove(&user_id)
    }

    /// Applies `f` to the user's value, inserting the default first when absent.
    pub async fn update<R>(&self, user_id: i64, f: impl FnOnce(&mut T) -> R) -> R
    where
        T: Default,
    {
        let mut guard = self.inner.write().await;
        f(guard.entry(user_id).or_default())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

/// State shared by the auth, group, posting, response and session handlers.
#[derive(Clone, Default)]
pub struct FeatureState {
    /// Login time per user with an active session.
    pub sessions: UserState<DateTime<Utc>>,
    pub groups: UserState<BTreeSet<i64>>,
    pub posts: UserState<String>,
    pub auto_replies: UserState<String>,
}
