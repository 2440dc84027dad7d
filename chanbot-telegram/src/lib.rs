//! # chanbot-telegram
//!
//! Telegram layer: adapters to core types, the [`chanbot_core::Bot`] implementation, channel
//! membership checks via `getChatMember`, client config (token, API URL, proxy) and the
//! long-polling runner that feeds the handler chain.

mod adapters;
mod bot_adapter;
mod checker;
mod config;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::TelegramBotAdapter;
pub use checker::TelegramSubscriptionChecker;
pub use config::TelegramConfig;
pub use runner::{fetch_bot_username, poll_updates, process_message};
