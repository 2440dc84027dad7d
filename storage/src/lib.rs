//! Storage crate: user records, bot settings and the subscription service built on them.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – UserRecord
//! - [`repository`] – Repository trait
//! - [`user_repo`] – UserRepository (SQLite)
//! - [`settings_repo`] – SettingsRepository (SQLite key/value)
//! - [`channel`] – RequiredChannel shared cell
//! - [`subscription_service`] – SubscriptionService
//! - [`sqlite_pool`] – SqlitePoolManager

mod channel;
mod error;
mod models;
mod repository;
mod settings_repo;
mod sqlite_pool;
mod subscription_service;
mod user_repo;


pub use channel::{channel_link, normalize_channel, RequiredChannel, REQUIRED_CHANNEL_KEY};
pub use error::StorageError;
pub use models::UserRecord;
pub use repository::Repository;
pub use settings_repo::SettingsRepository;
pub use sqlite_pool::SqlitePoolManager;
pub use subscription_service::SubscriptionService;
pub use user_repo::UserRepository;
