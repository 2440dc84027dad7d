//! Bot lifecycle: owns the handler chain and the liveness state, and runs the receive loop.
//!
//! Liveness is published on a `tokio::sync::watch` channel. Entering the loop is an atomic
//! Stopped → Running transition, so at most one receive loop runs at a time; a drop guard puts
//! the state back to Stopped however the loop ends (return, error, panic or cancellation).

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chanbot_core::Localizer;
use futures::FutureExt;
use handler_chain::HandlerChain;
use handlers::BotIdentity;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use crate::components::{build_handler_chain, BotComponents};

/// How long `restart` waits for a freshly started loop to fail before reporting it running.
pub const RESTART_SETTLE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotState {
    Stopped,
    Running,
}

impl BotState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BotState::Stopped => "stopped",
            BotState::Running => "running",
        }
    }
}

/// The receive loop. Returns when polling stops.
#[async_trait]
pub trait Poller: Send + Sync + 'static {
    async fn poll(&self, chain: HandlerChain) -> Result<()>;
}

/// Long polling against the Telegram Bot API.
pub struct TelegramPoller {
    bot: teloxide::Bot,
    localizer: Arc<Localizer>,
    identity: BotIdentity,
}

impl TelegramPoller {
    pub fn new(bot: teloxide::Bot, localizer: Arc<Localizer>, identity: BotIdentity) -> Self {
        Self {
            bot,
            localizer,
            identity,
        }
    }
}

#[async_trait]
impl Poller for TelegramPoller {
    async fn poll(&self, chain: HandlerChain) -> Result<()> {
        if let Some(username) = chanbot_telegram::fetch_bot_username(&self.bot).await {
            self.identity.set_username(username).await;
        }
        chanbot_telegram::poll_updates(self.bot.clone(), chain, self.localizer.clone()).await
    }
}

struct Inner {
    chain: HandlerChain,
    poller: Arc<dyn Poller>,
    state: watch::Sender<BotState>,
}

/// Resets the state to Stopped when the receive loop ends for any reason.
struct StoppedOnDrop<'a>(&'a watch::Sender<BotState>);

impl Drop for StoppedOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_replace(BotState::Stopped);
    }
}

/// Cloneable handle to the bot; clones share the chain and the liveness state.
#[derive(Clone)]
pub struct ChanBot {
    inner: Arc<Inner>,
}

impl ChanBot {
    /// The chain is built here, once; later runs reuse it.
    pub fn new(chain: HandlerChain, poller: Arc<dyn Poller>) -> Self {
        let (state, _) = watch::channel(BotState::Stopped);
        info!(handlers = ?chain.handler_names(), "Bot constructed");
        Self {
            inner: Arc::new(Inner {
                chain,
                poller,
                state,
            }),
        }
    }

    /// Builds the chain from components and polls Telegram.
    pub fn from_components(components: &BotComponents) -> Self {
        let poller = TelegramPoller::new(
            components.teloxide_bot.clone(),
            components.localizer.clone(),
            components.identity.clone(),
        );
        Self::new(build_handler_chain(components), Arc::new(poller))
    }

    pub fn state(&self) -> BotState {
        *self.inner.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state() == BotState::Running
    }

    /// Receiver observing every liveness transition.
    pub fn liveness(&self) -> watch::Receiver<BotState> {
        self.inner.state.subscribe()
    }

    pub fn handler_chain(&self) -> &HandlerChain {
        &self.inner.chain
    }

    /// Runs the receive loop until it stops. A call while already running is a no-op.
    #[instrument(skip(self))]
    pub async fn run(&self) {
        let started = self.inner.state.send_if_modified(|state| {
            if *state == BotState::Stopped {
                *state = BotState::Running;
                true
            } else {
                false
            }
        });
        if !started {
            warn!("Receive loop already running; ignoring run");
            return;
        }
        let _stopped = StoppedOnDrop(&self.inner.state);
        info!("Bot is running");

        let poll = self.inner.poller.poll(self.inner.chain.clone());
        match AssertUnwindSafe(poll).catch_unwind().await {
            Ok(Ok(())) => info!("Receive loop exited"),
            Ok(Err(e)) => error!(error = %e, "Receive loop failed"),
            Err(_) => error!("Receive loop panicked"),
        }
    }

    /// Starts `run` in the background and returns once the loop reports Running and has survived
    /// its startup, or has already ended. Returns the state observed at that point.
    pub async fn restart(&self) -> BotState {
        let mut liveness = self.liveness();
        let bot = self.clone();
        let mut handle = tokio::spawn(async move { bot.run().await });

        let entered = tokio::select! {
            _ = liveness.wait_for(|state| *state == BotState::Running) => true,
            _ = &mut handle => false,
        };
        if entered {
            // A loop whose startup fails ends within the settle period.
            let _ = tokio::time::timeout(RESTART_SETTLE, handle).await;
        }
        self.state()
    }
}
