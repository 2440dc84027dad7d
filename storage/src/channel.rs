//! The required channel: one process-wide optional channel handle, shared between the admin
//! commands that change it and the subscription gate that reads it on every update.

use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::error::StorageError;
use crate::settings_repo::SettingsRepository;

/// Settings key under which the channel handle is persisted.
pub const REQUIRED_CHANNEL_KEY: &str = "required_channel";

/// Normalizes `name`, `@name`, `t.me/name` or `https://t.me/name` to `@name`.
///
/// Telegram public usernames are 5–32 characters of `[A-Za-z0-9_]` starting with a letter.
pub fn normalize_channel(input: &str) -> Result<String, StorageError> {
    let trimmed = input.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let name = without_scheme
        .strip_prefix("t.me/")
        .or_else(|| without_scheme.strip_prefix("telegram.me/"))
        .or_else(|| without_scheme.strip_prefix('@'))
        .unwrap_or(without_scheme)
        .trim_end_matches('/');

    let valid_len = (5..=32).contains(&name.len());
    let starts_with_letter = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    let valid_chars = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !(valid_len && starts_with_letter && valid_chars) {
        return Err(StorageError::InvalidChannel(input.to_string()));
    }
    Ok(format!("@{}", name))
}

/// Shared cell holding the required channel. Clones share the same value.
///
/// Reads are synchronous and cheap; writes go through [`RequiredChannel::set`] and are persisted
/// when a settings repository is attached.
#[derive(Clone)]
pub struct RequiredChannel {
    value: Arc<RwLock<Option<String>>>,
    settings: Option<SettingsRepository>,
}

impl RequiredChannel {
    /// Cell that is not persisted.
    pub fn in_memory(initial: Option<String>) -> Self {
        Self {
            value: Arc::new(RwLock::new(initial)),
            settings: None,
        }
    }

    /// Loads the persisted channel; when the key was never written, `fallback` (e.g. from config)
    /// is used and persisted.
    pub async fn load(
        settings: SettingsRepository,
        fallback: Option<&str>,
    ) -> Result<Self, StorageError> {
        let stored = settings.get(REQUIRED_CHANNEL_KEY).await?;
        let initial = match (stored, fallback) {
            // An empty value records that an admin cleared the channel.
            (Some(stored), _) if stored.is_empty() => None,
            (Some(stored), _) => Some(stored),
            (None, Some(fallback)) => {
                let channel = normalize_channel(fallback)?;
                settings.set(REQUIRED_CHANNEL_KEY, &channel).await?;
                Some(channel)
            }
            (None, None) => None,
        };
        info!(channel = ?initial, "Required channel loaded");
        Ok(Self {
            value: Arc::new(RwLock::new(initial)),
            settings: Some(settings),
        })
    }

    /// Current channel handle (`@name`), if any.
    pub fn get(&self) -> Option<String> {
        match self.value.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Sets (`Some`) or clears (`None`) the channel. Returns the normalized value now in effect.
    pub async fn set(&self, channel: Option<&str>) -> Result<Option<String>, StorageError> {
        let normalized = channel.map(normalize_channel).transpose()?;

        if let Some(settings) = &self.settings {
            let stored = normalized.as_deref().unwrap_or_default();
            settings.set(REQUIRED_CHANNEL_KEY, stored).await?;
        }

        match self.value.write() {
            Ok(mut guard) => *guard = normalized.clone(),
            Err(poisoned) => {
                warn!("Required channel lock was poisoned; overwriting");
                *poisoned.into_inner() = normalized.clone();
            }
        }
        info!(channel = ?normalized, "Required channel updated");
        Ok(normalized)
    }

    /// `https://t.me/<name>` for the current channel.
    pub fn link(&self) -> Option<String> {
        self.get().map(|channel| channel_link(&channel))
    }
}

/// `https://t.me/<name>` for a normalized `@name` handle.
pub fn channel_link(channel: &str) -> String {
    format!("https://t.me/{}", channel.trim_start_matches('@'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite_pool::SqlitePoolManager;

    #[test]
    fn test_normalize_channel_forms() {
        for input in ["mychannel", "@mychannel", "t.me/mychannel", "https://t.me/mychannel/", " @mychannel "] {
            assert_eq!(normalize_channel(input).unwrap(), "@mychannel", "input: {}", input);
        }
    }

    #[test]
    fn test_normalize_channel_rejects_invalid() {
        for input in ["", "@", "abc", "1channel", "my-channel", "@a_very_long_channel_name_exceeding_limit"] {
            assert!(normalize_channel(input).is_err(), "input: {}", input);
        }
    }

    #[tokio::test]
    async fn test_in_memory_set_and_clear() {
        let channel = RequiredChannel::in_memory(None);
        let shared = channel.clone();
        assert_eq!(channel.get(), None);

        channel.set(Some("news_channel")).await.unwrap();
        assert_eq!(shared.get().as_deref(), Some("@news_channel"));
        assert_eq!(shared.link().as_deref(), Some("https://t.me/news_channel"));

        channel.set(None).await.unwrap();
        assert_eq!(shared.get(), None);
    }

    #[tokio::test]
    async fn test_invalid_channel_leaves_value_unchanged() {
        let channel = RequiredChannel::in_memory(Some("@news_channel".to_string()));
        assert!(channel.set(Some("bad channel")).await.is_err());
        assert_eq!(channel.get().as_deref(), Some("@news_channel"));
    }

    #[tokio::test]
    async fn test_persisted_channel_survives_reload() {
        let pool = SqlitePoolManager::new("sqlite::memory:").await.unwrap();
        let settings = SettingsRepository::new(pool.clone()).await.unwrap();

        let channel = RequiredChannel::load(settings.clone(), None).await.unwrap();
        assert_eq!(channel.get(), None);
        channel.set(Some("@persisted_one")).await.unwrap();

        let reloaded = RequiredChannel::load(settings.clone(), Some("@fallback_one"))
            .await
            .unwrap();
        assert_eq!(reloaded.get().as_deref(), Some("@persisted_one"));

        let fresh = SettingsRepository::new(SqlitePoolManager::new("sqlite::memory:").await.unwrap())
            .await
            .unwrap();
        let fallback = RequiredChannel::load(fresh, Some("fallback_one")).await.unwrap();
        assert_eq!(fallback.get().as_deref(), Some("@fallback_one"));
    }

    #[tokio::test]
    async fn test_cleared_channel_survives_reload() {
        let pool = SqlitePoolManager::new("sqlite::memory:").await.unwrap();
        let settings = SettingsRepository::new(pool).await.unwrap();

        let channel = RequiredChannel::load(settings.clone(), Some("@fallback_one"))
            .await
            .unwrap();
        assert_eq!(channel.get().as_deref(), Some("@fallback_one"));
        channel.set(None).await.unwrap();

        let reloaded = RequiredChannel::load(settings.clone(), Some("@fallback_one"))
            .await
            .unwrap();
        assert_eq!(reloaded.get(), None);
        assert_eq!(reloaded.link(), None);
        assert_eq!(settings.get(REQUIRED_CHANNEL_KEY).await.unwrap().as_deref(), Some(""));
    }
}
