//! # Middleware
//!
//! Middleware run ahead of every feature handler in the chain. The only one so far is the
//! [`SubscriptionGate`], which keeps users out until they join the required channel.

mod subscription_gate;

#[cfg(test)]
mod test;

pub use subscription_gate::{AllowReason, GateDecision, SubscriptionGate, ADMIN_COMMAND_PREFIXES};
