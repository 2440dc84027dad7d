//! # chanbot
//!
//! Composition root: config, component factory, handler chain wiring, bot lifecycle with a
//! liveness channel, watchdog supervisor and keep-alive endpoint.

pub mod cli;
pub mod components;
pub mod config;
pub mod keep_alive;
pub mod lifecycle;
pub mod runner;
pub mod watchdog;

pub use cli::Cli;
pub use components::{build_bot_components, build_handler_chain, BotComponents};
pub use config::{BotConfig, WatchdogConfig};
pub use lifecycle::{BotState, ChanBot, Poller, TelegramPoller};
pub use runner::run_bot;
pub use watchdog::{RestartPolicy, Supervised, Watchdog};
