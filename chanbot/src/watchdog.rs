//! Watchdog: periodically checks liveness and restarts the bot, backing off exponentially after
//! repeated failures. Runs as a background task and never terminates.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use crate::config::WatchdogConfig;
use crate::lifecycle::{BotState, ChanBot};

/// Something the watchdog can observe and restart.
#[async_trait]
pub trait Supervised: Send + Sync {
    fn is_running(&self) -> bool;

    /// Attempts a restart. The watchdog re-checks [`Supervised::is_running`] afterwards.
    async fn restart(&self) -> Result<()>;
}

#[async_trait]
impl Supervised for ChanBot {
    fn is_running(&self) -> bool {
        ChanBot::is_running(self)
    }

    async fn restart(&self) -> Result<()> {
        let state = ChanBot::restart(self).await;
        debug!(state = state.as_str(), "Restart returned");
        Ok(())
    }
}

/// Consecutive-failure counter and backoff interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartPolicy {
    base_backoff: Duration,
    max_backoff: Duration,
    max_failures: u32,
    failures: u32,
    backoff: Duration,
}

impl RestartPolicy {
    /// The backoff starts at the check interval.
    pub fn new(config: &WatchdogConfig) -> Self {
        Self {
            base_backoff: config.check_interval,
            max_backoff: config.max_backoff,
            max_failures: config.max_restarts,
            failures: 0,
            backoff: config.check_interval,
        }
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// A restart brought the bot back: counter → 0, backoff → base.
    pub fn record_success(&mut self) {
        self.failures = 0;
        self.backoff = self.base_backoff;
    }

    /// Counts a failed restart. When the limit is reached, returns the pause to take now, resets
    /// the counter and doubles the backoff (capped).
    pub fn record_failure(&mut self) -> Option<Duration> {
        self.failures += 1;
        if self.failures < self.max_failures {
            return None;
        }
        let pause = self.backoff;
        self.failures = 0;
        self.backoff = (self.backoff * 2).min(self.max_backoff);
        Some(pause)
    }
}

pub struct Watchdog {
    target: Arc<dyn Supervised>,
    config: WatchdogConfig,
    policy: RestartPolicy,
}

impl Watchdog {
    pub fn new(target: Arc<dyn Supervised>, config: WatchdogConfig) -> Self {
        let policy = RestartPolicy::new(&config);
        Self {
            target,
            config,
            policy,
        }
    }

    pub fn policy(&self) -> &RestartPolicy {
        &self.policy
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Supervision loop. A panic inside a cycle is logged and followed by the error pause.
    #[instrument(skip(self), fields(check_interval = ?self.config.check_interval))]
    pub async fn run(mut self) {
        info!("Watchdog started");
        loop {
            if AssertUnwindSafe(self.run_cycle()).catch_unwind().await.is_err() {
                error!(pause = ?self.config.error_pause, "Watchdog cycle panicked");
                sleep(self.config.error_pause).await;
            }
        }
    }

    /// One cycle: wait the check interval, then restart the target if it is not running.
    pub async fn run_cycle(&mut self) {
        sleep(self.config.check_interval).await;
        if self.target.is_running() {
            debug!(state = BotState::Running.as_str(), "Bot is healthy");
            return;
        }

        let attempt = self.policy.failures() + 1;
        warn!(attempt, "Bot is not running, restarting");
        if let Err(e) = self.target.restart().await {
            error!(error = %e, attempt, "Restart returned an error");
        }

        if self.target.is_running() {
            info!(attempt, "Bot restarted successfully");
            self.policy.record_success();
            return;
        }

        error!(attempt, "Bot restart failed");
        if let Some(pause) = self.policy.record_failure() {
            warn!(
                pause = ?pause,
                next_backoff = ?self.policy.backoff(),
                "Too many failed restarts, backing off"
            );
            sleep(pause).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RestartPolicy {
        RestartPolicy::new(&WatchdogConfig::default())
    }

    #[test]
    fn test_backoff_after_max_failures() {
        let mut policy = policy();
        for _ in 0..4 {
            assert_eq!(policy.record_failure(), None);
        }
        assert_eq!(policy.record_failure(), Some(Duration::from_secs(60)));
        assert_eq!(policy.failures(), 0);
        assert_eq!(policy.backoff(), Duration::from_secs(120));
    }

    #[test]
    fn test_backoff_is_capped() {
        let mut policy = policy();
        let mut pauses = Vec::new();
        for _ in 0..(5 * 8) {
            if let Some(pause) = policy.record_failure() {
                pauses.push(pause.as_secs());
            }
        }
        assert_eq!(pauses, vec![60, 120, 240, 480, 960, 1920, 3600, 3600]);
        assert_eq!(policy.backoff(), Duration::from_secs(3600));
    }

    #[test]
    fn test_success_resets_counter_and_backoff() {
        let mut policy = policy();
        for _ in 0..5 {
            policy.record_failure();
        }
        policy.record_failure();
        policy.record_failure();
        assert_eq!(policy.failures(), 2);

        policy.record_success();

        assert_eq!(policy.failures(), 0);
        assert_eq!(policy.backoff(), Duration::from_secs(60));
    }
}
