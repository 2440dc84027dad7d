//! Monitoring: observes every message that passed the gate and reports counts via `/stats`.
//!
//! Registered last; counting happens in `after` so it sees messages already answered by an
//! earlier handler.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chanbot_core::{Handler, HandlerResponse, Message, Result};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::command::{self, CommandSpec};
use crate::context::HandlerContext;

/// Snapshot of what the monitor has seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringStats {
    pub total: u64,
    pub per_chat: HashMap<i64, u64>,
    pub last_seen: Option<DateTime<Utc>>,
    pub since: DateTime<Utc>,
}

pub struct MonitoringHandler {
    ctx: HandlerContext,
    stats: Arc<RwLock<MonitoringStats>>,
}

impl MonitoringHandler {
    pub const COMMANDS: &'static [CommandSpec] = &[CommandSpec::admin("stats", "cmd-stats")];

    pub fn new(ctx: HandlerContext) -> Self {
        Self {
            ctx,
            stats: Arc::new(RwLock::new(MonitoringStats {
                total: 0,
                per_chat: HashMap::new(),
                last_seen: None,
                since: Utc::now(),
            })),
        }
    }

    pub async fn stats(&self) -> MonitoringStats {
        self.stats.read().await.clone()
    }
}

#[async_trait]
impl Handler for MonitoringHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Some(cmd) = message.command() else {
            return Ok(HandlerResponse::Continue);
        };
        if command::find(Self::COMMANDS, cmd.name).is_none() {
            return Ok(HandlerResponse::Continue);
        }
        if let Some(refusal) = self.ctx.refuse_non_admin(message).await? {
            return Ok(refusal);
        }

        let stats = self.stats().await;
        let total = stats.total.to_string();
        let chats = stats.per_chat.len().to_string();
        let since = self.ctx.format_time(message, Some(stats.since));
        let text = self.ctx.t_args(
            message,
            "monitoring-stats",
            &[("total", &total), ("chats", &chats), ("since", &since)],
        );
        self.ctx.reply(message, text).await
    }

    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        let total = {
            let mut stats = self.stats.write().await;
            stats.total += 1;
            *stats.per_chat.entry(message.chat.id).or_insert(0) += 1;
            stats.last_seen = Some(message.created_at);
            stats.total
        };
        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            message_type = %message.message_type,
            total,
            "Message observed"
        );
        debug!(response = ?response, "Final chain response");
        Ok(())
    }
}
