//! Long polling: converts teloxide messages to core messages and hands them to the HandlerChain.
//! Each update is processed in its own task; a failing chain is logged and the user gets a
//! localized generic error.

use std::sync::Arc;

use anyhow::{Context, Result};
use chanbot_core::{Bot as CoreBot, Localizer, Message as CoreMessage, ToCoreMessage};
use handler_chain::HandlerChain;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use tracing::{debug, error, info, instrument, warn};

use crate::adapters::TelegramMessageWrapper;
use crate::bot_adapter::TelegramBotAdapter;

/// Calls `getMe` and returns the bot's username; failures are logged and yield `None`.
pub async fn fetch_bot_username(bot: &teloxide::Bot) -> Option<String> {
    match bot.get_me().await {
        Ok(me) => {
            let username = me.user.username.clone();
            info!(username = ?username, "Bot identity fetched");
            username
        }
        Err(e) => {
            warn!(error = %e, "getMe failed; referral links unavailable until next start");
            None
        }
    }
}

/// Runs the chain for one message and reports a failure back to the sender.
#[instrument(skip_all, fields(user_id = message.user.id, chat_id = message.chat.id, message_id = %message.id))]
pub async fn process_message(
    chain: &HandlerChain,
    bot: &dyn CoreBot,
    localizer: &Localizer,
    message: CoreMessage,
) {
    info!("step: processing message (handler chain started)");
    if let Err(e) = chain.handle(&message).await {
        error!(error = %e, "Handler chain failed");
        let text = localizer.t("error-generic", message.language());
        if let Err(send_err) = bot.reply_to(&message, &text).await {
            warn!(error = %send_err, "Failed to report handler error to user");
        }
    }
}

/// Drops updates queued before startup, then long-polls until the dispatcher stops.
///
/// Returns an error only when startup fails; listener errors are logged by the dispatcher.
#[instrument(skip_all)]
pub async fn poll_updates(bot: teloxide::Bot, chain: HandlerChain, localizer: Arc<Localizer>) -> Result<()> {
    bot.delete_webhook()
        .drop_pending_updates(true)
        .await
        .context("deleteWebhook failed")?;
    info!("Pending updates dropped, starting long polling");

    let reply_bot: Arc<dyn CoreBot> = Arc::new(TelegramBotAdapter::new(bot.clone()));
    let handler = Update::filter_message().endpoint(move |msg: teloxide::types::Message| {
        let chain = chain.clone();
        let reply_bot = reply_bot.clone();
        let localizer = localizer.clone();
        async move {
            match TelegramMessageWrapper(&msg).to_core() {
                Some(core_msg) => {
                    info!(
                        user_id = core_msg.user.id,
                        chat_id = core_msg.chat.id,
                        message_type = %core_msg.message_type,
                        "Received message"
                    );
                    tokio::spawn(async move {
                        process_message(&chain, reply_bot.as_ref(), &localizer, core_msg).await;
                    });
                }
                None => debug!(chat_id = msg.chat.id.0, "Skipping message without sender"),
            }
            respond(())
        }
    });

    Dispatcher::builder(bot, handler)
        .default_handler(|update| async move {
            debug!(update_id = ?update.id, "Unhandled update kind");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .build()
        .dispatch()
        .await;

    info!("Long polling stopped");
    Ok(())
}
