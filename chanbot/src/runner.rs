use anyhow::Result;
use chanbot_core::init_tracing;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, instrument};

use crate::components::build_bot_components;
use crate::config::BotConfig;
use crate::keep_alive::spawn_keep_alive;
use crate::lifecycle::ChanBot;
use crate::watchdog::Watchdog;

/// Status log interval of the main wait loop.
const STATUS_INTERVAL: Duration = Duration::from_secs(60);

/// Main entry: init logging, validate config, build components, start keep-alive and watchdog,
/// run the receive loop, then log status until Ctrl-C.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(Some(config.log_file.as_str()))?;

    info!(
        data_dir = %config.data_dir.display(),
        proxy = config.telegram.proxy.is_some(),
        "Initializing bot"
    );

    let components = build_bot_components(&config, None, None).await?;
    let bot = ChanBot::from_components(&components);

    let keep_alive = spawn_keep_alive(config.keep_alive_addr.clone(), bot.liveness());
    let watchdog = Watchdog::new(Arc::new(bot.clone()), config.watchdog.clone()).spawn();

    info!("Bot started successfully");

    tokio::select! {
        _ = supervise(&bot) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Ctrl-C received, shutting down");
        }
    }

    watchdog.abort();
    keep_alive.abort();
    info!("Bot stopped");
    Ok(())
}

/// Runs the receive loop once, then keeps the process alive while the watchdog takes over.
async fn supervise(bot: &ChanBot) {
    bot.run().await;

    let mut ticker = interval(STATUS_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        info!(state = bot.state().as_str(), "Bot status");
    }
}
