//! # chanbot-core
//!
//! Core types and traits for the bot: [`Bot`], [`Handler`], [`Middleware`], [`SubscriptionChecker`],
//! message and user types, localization, and tracing initialization. Transport-agnostic; used by
//! handler-chain, middleware, handlers and chanbot-telegram.

pub mod bot;
pub mod error;
pub mod locale;
pub mod logger;
pub mod subscription;
pub mod types;

pub use bot::{Bot, LinkButton};
pub use error::{ChanbotError, HandlerError, Result};
pub use locale::{Localizer, DEFAULT_LOCALE};
pub use logger::init_tracing;
pub use subscription::{MembershipStatus, SubscriptionChecker, SubscriptionStatus};
pub use types::{Chat, Command, Handler, HandlerResponse, Message, Middleware, ToCoreMessage, User};
