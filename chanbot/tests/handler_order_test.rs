//! Integration tests for the assembled handler chain: registration order and end-to-end flows
//! over a real SQLite database in a temp directory, with Telegram replaced by fakes.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chanbot::{build_bot_components, build_handler_chain, BotComponents, BotConfig, WatchdogConfig};
use chanbot_core::{
    Bot, Chat, HandlerResponse, LinkButton, MembershipStatus, Message, SubscriptionChecker,
    SubscriptionStatus, User,
};
use chanbot_telegram::TelegramConfig;
use chrono::Utc;
use tempfile::TempDir;

const ADMIN_ID: i64 = 1;
const USER_ID: i64 = 42;

#[derive(Default)]
struct RecordingBot {
    sent: Mutex<Vec<(i64, String, Option<LinkButton>)>>,
}

impl RecordingBot {
    fn take(&self) -> Vec<(i64, String, Option<LinkButton>)> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> chanbot_core::Result<()> {
        self.sent.lock().unwrap().push((chat.id, text.to_string(), None));
        Ok(())
    }

    async fn send_message_with_link(
        &self,
        chat: &Chat,
        text: &str,
        button: &LinkButton,
    ) -> chanbot_core::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((chat.id, text.to_string(), Some(button.clone())));
        Ok(())
    }
}

/// Reports every user as having left the channel.
struct NobodySubscribed;

#[async_trait]
impl SubscriptionChecker for NobodySubscribed {
    async fn check(&self, _channel: &str, _user_id: i64) -> chanbot_core::Result<SubscriptionStatus> {
        Ok(SubscriptionStatus::new(false, MembershipStatus::Left))
    }
}

fn config_in(dir: &TempDir, required_channel: Option<&str>) -> BotConfig {
    BotConfig {
        telegram: TelegramConfig::with_token("123:abc".to_string()),
        api_id: None,
        api_hash: None,
        data_dir: dir.path().join("data"),
        log_file: dir.path().join("chanbot.log").to_string_lossy().into_owned(),
        admin_ids: vec![ADMIN_ID],
        locale: "en".to_string(),
        keep_alive_addr: "127.0.0.1:0".to_string(),
        required_channel: required_channel.map(str::to_string),
        watchdog: WatchdogConfig::default(),
    }
}

async fn components_in(
    dir: &TempDir,
    required_channel: Option<&str>,
) -> (BotComponents, Arc<RecordingBot>) {
    let bot = Arc::new(RecordingBot::default());
    let components = build_bot_components(
        &config_in(dir, required_channel),
        Some(bot.clone()),
        Some(Arc::new(NobodySubscribed)),
    )
    .await
    .unwrap();
    (components, bot)
}

fn message_from(user_id: i64, content: &str) -> Message {
    Message {
        id: format!("{}-{}", user_id, content),
        user: User {
            id: user_id,
            username: None,
            first_name: Some("Sam".to_string()),
            last_name: None,
            language_code: Some("en".to_string()),
        },
        chat: Chat {
            id: user_id,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
        message_type: "text".to_string(),
        created_at: Utc::now(),
    }
}

/// **Test: The gate is the only middleware and handlers run in their fixed order, monitoring last.**
#[tokio::test]
async fn test_registration_order() {
    let dir = TempDir::new().unwrap();
    let (components, _bot) = components_in(&dir, None).await;

    let chain = build_handler_chain(&components);

    assert_eq!(chain.middleware_names(), vec!["subscription_gate"]);
    assert_eq!(
        chain.handler_names(),
        vec![
            "start_help",
            "auth",
            "group",
            "posting",
            "response",
            "referral",
            "session",
            "profile",
            "subscription",
            "admin",
            "monitoring",
        ]
    );
}

/// **Test: Building components creates the data directory and the database file.**
#[tokio::test]
async fn test_components_create_data_dir() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, None);
    assert!(!config.data_dir.exists());

    let (_components, _bot) = components_in(&dir, None).await;

    assert!(config.data_dir.is_dir());
    assert!(config.database_path().is_file());
}

/// **Test: An unsubscribed user is stopped at the gate with one prompt carrying the join link.**
#[tokio::test]
async fn test_unsubscribed_user_is_gated() {
    let dir = TempDir::new().unwrap();
    let (components, bot) = components_in(&dir, Some("t.me/news_channel")).await;
    let chain = build_handler_chain(&components);

    let response = chain.handle(&message_from(USER_ID, "/start")).await.unwrap();

    assert_eq!(response, HandlerResponse::Stop);
    let sent = bot.take();
    assert_eq!(sent.len(), 1);
    let (chat_id, text, button) = &sent[0];
    assert_eq!(*chat_id, USER_ID);
    assert!(text.contains("@news_channel"));
    assert_eq!(button.as_ref().unwrap().url, "https://t.me/news_channel");
}

/// **Test: An admin disables the requirement and the same user then reaches the handlers.**
#[tokio::test]
async fn test_admin_disables_gate() {
    let dir = TempDir::new().unwrap();
    let (components, bot) = components_in(&dir, Some("@news_channel")).await;
    let chain = build_handler_chain(&components);

    let response = chain
        .handle(&message_from(ADMIN_ID, "/setchannel off"))
        .await
        .unwrap();
    assert!(matches!(response, HandlerResponse::Reply(_)));
    assert_eq!(components.channel.get(), None);
    bot.take();

    let response = chain.handle(&message_from(USER_ID, "/start")).await.unwrap();

    match response {
        HandlerResponse::Reply(text) => assert!(text.contains("Welcome")),
        other => panic!("expected a reply, got {:?}", other),
    }
    let sent = bot.take();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].2.is_none());
}

/// **Test: A channel set by an admin survives a rebuild; the config value does not override it.**
#[tokio::test]
async fn test_channel_persists_across_rebuild() {
    let dir = TempDir::new().unwrap();
    {
        let (components, _bot) = components_in(&dir, Some("@first_channel")).await;
        let chain = build_handler_chain(&components);
        chain
            .handle(&message_from(ADMIN_ID, "/setchannel @second_channel"))
            .await
            .unwrap();
    }

    let (components, _bot) = components_in(&dir, Some("@first_channel")).await;

    assert_eq!(components.channel.get().as_deref(), Some("@second_channel"));
}

/// **Test: A channel cleared by an admin stays cleared after a rebuild with a configured channel.**
#[tokio::test]
async fn test_cleared_channel_persists_across_rebuild() {
    let dir = TempDir::new().unwrap();
    {
        let (components, _bot) = components_in(&dir, Some("@first_channel")).await;
        let chain = build_handler_chain(&components);
        chain
            .handle(&message_from(ADMIN_ID, "/setchannel off"))
            .await
            .unwrap();
        assert_eq!(components.channel.get(), None);
    }

    let (components, bot) = components_in(&dir, Some("@first_channel")).await;
    let chain = build_handler_chain(&components);

    assert_eq!(components.channel.get(), None);
    let response = chain.handle(&message_from(USER_ID, "/start")).await.unwrap();
    assert!(matches!(response, HandlerResponse::Reply(_)));
    assert!(bot.take().iter().all(|(_, _, button)| button.is_none()));
}

/// **Test: A non-admin cannot change the channel even though admin commands pass the gate.**
#[tokio::test]
async fn test_non_admin_cannot_set_channel() {
    let dir = TempDir::new().unwrap();
    let (components, bot) = components_in(&dir, Some("@news_channel")).await;
    let chain = build_handler_chain(&components);

    chain
        .handle(&message_from(USER_ID, "/setchannel off"))
        .await
        .unwrap();

    assert_eq!(components.channel.get().as_deref(), Some("@news_channel"));
    let sent = bot.take();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("administrators only"));
}
