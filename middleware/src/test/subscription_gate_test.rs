//! Unit tests for SubscriptionGate: every row of the decision table, plus the prompt side effect.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chanbot_core::{
    Bot, ChanbotError, Chat, LinkButton, Localizer, MembershipStatus, Message, Middleware,
    SubscriptionChecker, SubscriptionStatus, User,
};
use chrono::Utc;
use mockall::mock;
use storage::{RequiredChannel, SqlitePoolManager, SubscriptionService, UserRepository};

use crate::{AllowReason, GateDecision, SubscriptionGate};

mock! {
    pub Checker {}

    #[async_trait]
    impl SubscriptionChecker for Checker {
        async fn check(&self, channel: &str, user_id: i64) -> chanbot_core::Result<SubscriptionStatus>;
    }
}

/// One message sent through the recording bot.
#[derive(Debug, Clone)]
struct Sent {
    chat_id: i64,
    text: String,
    button: Option<LinkButton>,
}

#[derive(Default)]
struct RecordingBot {
    sent: Mutex<Vec<Sent>>,
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> chanbot_core::Result<()> {
        self.sent.lock().unwrap().push(Sent {
            chat_id: chat.id,
            text: text.to_string(),
            button: None,
        });
        Ok(())
    }

    async fn send_message_with_link(
        &self,
        chat: &Chat,
        text: &str,
        button: &LinkButton,
    ) -> chanbot_core::Result<()> {
        self.sent.lock().unwrap().push(Sent {
            chat_id: chat.id,
            text: text.to_string(),
            button: Some(button.clone()),
        });
        Ok(())
    }
}

const ADMIN_ID: i64 = 1;
const USER_ID: i64 = 500;

fn sample_message(user_id: i64, content: &str, language_code: Option<&str>) -> Message {
    Message {
        id: "msg-1".to_string(),
        user: User {
            id: user_id,
            username: Some("someone".to_string()),
            first_name: Some("Someone".to_string()),
            last_name: None,
            language_code: language_code.map(str::to_string),
        },
        chat: Chat {
            id: 900,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
        message_type: "text".to_string(),
        created_at: Utc::now(),
    }
}

fn subscribed(is_subscribed: bool) -> SubscriptionStatus {
    let membership = if is_subscribed {
        MembershipStatus::Member
    } else {
        MembershipStatus::Left
    };
    SubscriptionStatus::new(is_subscribed, membership)
}

async fn gate_with(channel: Option<&str>, checker: MockChecker) -> (SubscriptionGate, Arc<RecordingBot>) {
    let pool = SqlitePoolManager::new("sqlite::memory:").await.unwrap();
    let service = Arc::new(SubscriptionService::new(
        UserRepository::new(pool).await.unwrap(),
        [ADMIN_ID],
    ));
    let bot = Arc::new(RecordingBot::default());
    let gate = SubscriptionGate::new(
        RequiredChannel::in_memory(channel.map(str::to_string)),
        service,
        Arc::new(checker),
        bot.clone(),
        Arc::new(Localizer::new("ar").unwrap()),
    );
    (gate, bot)
}

#[tokio::test]
async fn test_no_channel_allows_without_check() {
    let mut checker = MockChecker::new();
    checker.expect_check().times(0);
    let (gate, bot) = gate_with(None, checker).await;

    let msg = sample_message(USER_ID, "hello", None);

    assert_eq!(gate.decide(&msg).await, GateDecision::Allow(AllowReason::NoChannelRequired));
    assert!(gate.before(&msg).await.unwrap());
    assert!(bot.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_command_prefix_bypasses_gate() {
    let mut checker = MockChecker::new();
    checker.expect_check().times(0);
    let (gate, bot) = gate_with(Some("@news_channel"), checker).await;

    for text in ["/setchannel off", "/listusers", "/adduser 5 30", "/channel_subscription"] {
        let msg = sample_message(USER_ID, text, None);
        assert_eq!(gate.decide(&msg).await, GateDecision::Allow(AllowReason::AdminCommand));
        assert!(gate.before(&msg).await.unwrap());
    }
    assert!(bot.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_command_in_caption_or_after_whitespace_is_gated() {
    let mut checker = MockChecker::new();
    checker.expect_check().times(2).returning(|_, _| Ok(subscribed(false)));
    let (gate, bot) = gate_with(Some("@news_channel"), checker).await;

    let mut captioned = sample_message(USER_ID, "/adduser 500 365", None);
    captioned.message_type = "photo".to_string();
    let indented = sample_message(USER_ID, "  /setchannel off", None);

    for msg in [captioned, indented] {
        assert!(matches!(gate.decide(&msg).await, GateDecision::Deny { .. }));
    }
    assert!(bot.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_bypasses_gate_when_not_subscribed() {
    let mut checker = MockChecker::new();
    checker.expect_check().times(0);
    let (gate, bot) = gate_with(Some("@news_channel"), checker).await;

    let msg = sample_message(ADMIN_ID, "/profile", None);

    assert_eq!(gate.decide(&msg).await, GateDecision::Allow(AllowReason::Admin));
    assert!(gate.before(&msg).await.unwrap());
    assert!(bot.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_subscribed_user_allowed_without_side_effect() {
    let mut checker = MockChecker::new();
    checker
        .expect_check()
        .withf(|channel, user_id| channel == "@news_channel" && *user_id == USER_ID)
        .times(1)
        .returning(|_, _| Ok(subscribed(true)));
    let (gate, bot) = gate_with(Some("@news_channel"), checker).await;

    let msg = sample_message(USER_ID, "hello", None);

    assert!(gate.before(&msg).await.unwrap());
    assert!(bot.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unsubscribed_user_denied_with_one_prompt_and_one_button() {
    let mut checker = MockChecker::new();
    checker.expect_check().times(1).returning(|_, _| Ok(subscribed(false)));
    let (gate, bot) = gate_with(Some("@news_channel"), checker).await;

    let msg = sample_message(USER_ID, "hello", Some("en"));

    assert!(!gate.before(&msg).await.unwrap());

    let sent = bot.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat_id, 900);
    assert!(sent[0].text.contains("@news_channel"));
    let button = sent[0].button.as_ref().expect("prompt must carry a button");
    assert_eq!(button.url, "https://t.me/news_channel");
    assert!(button.text.contains("Join"));
}

#[tokio::test]
async fn test_prompt_defaults_to_configured_locale() {
    let mut checker = MockChecker::new();
    checker.expect_check().returning(|_, _| Ok(subscribed(false)));
    let (gate, bot) = gate_with(Some("@news_channel"), checker).await;

    gate.before(&sample_message(USER_ID, "hello", None)).await.unwrap();

    let sent = bot.sent.lock().unwrap();
    assert!(sent[0].text.contains("يجب عليك الاشتراك"));
}

#[tokio::test]
async fn test_checker_error_denies() {
    let mut checker = MockChecker::new();
    checker
        .expect_check()
        .returning(|_, _| Err(ChanbotError::Subscription("bot is not a channel admin".to_string())));
    let (gate, bot) = gate_with(Some("@news_channel"), checker).await;

    let msg = sample_message(USER_ID, "hello", None);

    assert_eq!(
        gate.decide(&msg).await,
        GateDecision::Deny {
            channel: "@news_channel".to_string()
        }
    );
    assert!(!gate.before(&msg).await.unwrap());
    assert_eq!(bot.sent.lock().unwrap().len(), 1);
}
