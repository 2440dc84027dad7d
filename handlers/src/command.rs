//! Command tables.

use crate::{
    AdminHandler, AuthHandler, GroupHandler, MonitoringHandler, PostingHandler, ProfileHandler,
    ReferralHandler, ResponseHandler, SessionHandler, StartHelpHandler, SubscriptionHandler,
};

/// One bot command: name without `/`, the locale key of its description, and who may run it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub command: &'static str,
    pub description_key: &'static str,
    pub admin_only: bool,
}

impl CommandSpec {
    pub const fn user(command: &'static str, description_key: &'static str) -> Self {
        Self {
            command,
            description_key,
            admin_only: false,
        }
    }

    pub const fn admin(command: &'static str, description_key: &'static str) -> Self {
        Self {
            command,
            description_key,
            admin_only: true,
        }
    }
}

/// Every command of every handler, in registration order.
pub fn command_catalog() -> Vec<&'static CommandSpec> {
    [
        StartHelpHandler::COMMANDS,
        AuthHandler::COMMANDS,
        GroupHandler::COMMANDS,
        PostingHandler::COMMANDS,
        ResponseHandler::COMMANDS,
        ReferralHandler::COMMANDS,
        SessionHandler::COMMANDS,
        ProfileHandler::COMMANDS,
        SubscriptionHandler::COMMANDS,
        AdminHandler::COMMANDS,
        MonitoringHandler::COMMANDS,
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Looks up `name` (case-insensitive) in `table`.
pub(crate) fn find(table: &'static [CommandSpec], name: &str) -> Option<&'static CommandSpec> {
    table.iter().find(|spec| spec.command.eq_ignore_ascii_case(name))
}
