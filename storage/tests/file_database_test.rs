//! Integration test for [`storage`] against an on-disk SQLite database.
//!
//! Users and the required channel written through one pool are visible after reopening the file.

use storage::{RequiredChannel, SettingsRepository, SqlitePoolManager, SubscriptionService, UserRepository};
use tempfile::TempDir;

/// **Test: Data written to a file database survives reopening it.**
///
/// **Setup:** Temp dir; open `chanbot.db`, grant a subscription and set the channel.
/// **Action:** Reopen the same file with fresh pool and repositories.
/// **Expected:** The user and the channel are loaded back.
#[tokio::test]
async fn test_file_database_persists_users_and_channel() {
    let temp_dir = TempDir::new().unwrap();
    let url = format!("file:{}/chanbot.db", temp_dir.path().display());

    {
        let pool = SqlitePoolManager::new(&url).await.unwrap();
        let service = SubscriptionService::new(UserRepository::new(pool.clone()).await.unwrap(), []);
        service.grant_subscription(7, 10).await.unwrap();
        let channel = RequiredChannel::load(SettingsRepository::new(pool).await.unwrap(), None)
            .await
            .unwrap();
        channel.set(Some("https://t.me/stored_channel")).await.unwrap();
    }

    let pool = SqlitePoolManager::new(&url).await.unwrap();
    let service = SubscriptionService::new(UserRepository::new(pool.clone()).await.unwrap(), []);
    let channel = RequiredChannel::load(SettingsRepository::new(pool).await.unwrap(), None)
        .await
        .unwrap();

    assert!(service.get_user(7).await.unwrap().is_some());
    assert_eq!(channel.get().as_deref(), Some("@stored_channel"));
}
