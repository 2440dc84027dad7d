//! # Feature handlers
//!
//! One handler per feature domain. Each exposes a static command table and replies through the
//! shared [`HandlerContext`]; the composition root registers them in a fixed order.
//!
//! | Handler | Commands |
//! |---------|----------|
//! | [`StartHelpHandler`] | `/start [ref_<id>]`, `/help` |
//! | [`AuthHandler`] | `/login`, `/logout`, `/auth_status` |
//! | [`GroupHandler`] | `/add_group`, `/remove_group`, `/groups` |
//! | [`PostingHandler`] | `/post`, `/stop_posting`, `/posting_status` |
//! | [`ResponseHandler`] | `/auto_reply`, `/auto_reply_off` |
//! | [`ReferralHandler`] | `/referral` |
//! | [`SessionHandler`] | `/sessions` |
//! | [`ProfileHandler`] | `/profile` |
//! | [`SubscriptionHandler`] | `/subscription`, `/set_subscription` |
//! | [`AdminHandler`] | `/setchannel`, `/channel_subscription`, `/adduser`, `/removeuser`, `/checkuser`, `/listusers` |
//! | [`MonitoringHandler`] | `/stats`, observes every message |

mod admin;
mod auth;
mod command;
mod context;
mod group;
mod monitoring;
mod posting;
mod profile;
mod referral;
mod response;
mod session;
mod start_help;
mod state;
mod subscription;

#[cfg(test)]
mod test;

pub use admin::AdminHandler;
pub use auth::{AuthHandler, AuthOptions};
pub use command::{command_catalog, CommandSpec};
pub use context::{BotIdentity, HandlerContext};
pub use group::GroupHandler;
pub use monitoring::{MonitoringHandler, MonitoringStats};
pub use posting::PostingHandler;
pub use profile::ProfileHandler;
pub use referral::ReferralHandler;
pub use response::ResponseHandler;
pub use session::SessionHandler;
pub use start_help::StartHelpHandler;
pub use state::{FeatureState, UserState};
pub use subscription::SubscriptionHandler;
