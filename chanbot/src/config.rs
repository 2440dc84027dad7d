//! Application config, loaded from environment variables (optionally via `.env`).
//!
//! | Variable | Default |
//! |----------|---------|
//! | `BOT_TOKEN` | required |
//! | `TELEGRAM_API_URL` / `TELOXIDE_API_URL` | Telegram default |
//! | `API_ID`, `API_HASH` | unset |
//! | `DATA_DIR` | `data` |
//! | `LOG_FILE` | `logs/chanbot.log` |
//! | `ADMIN_IDS` | empty (comma-separated user ids) |
//! | `BOT_LOCALE` | `ar` |
//! | `KEEP_ALIVE_ADDR` | `0.0.0.0:8080` |
//! | `REQUIRED_CHANNEL` | unset |
//! | `WATCHDOG_CHECK_INTERVAL_SECS` | 60 |
//! | `WATCHDOG_MAX_RESTARTS` | 5 |
//! | `WATCHDOG_MAX_BACKOFF_SECS` | 3600 |
//! | `WATCHDOG_ERROR_PAUSE_SECS` | 30 |

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chanbot_core::{Localizer, DEFAULT_LOCALE};
use chanbot_telegram::TelegramConfig;

/// Watchdog timing. The backoff starts at the check interval and doubles up to `max_backoff`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchdogConfig {
    pub check_interval: Duration,
    pub max_restarts: u32,
    pub max_backoff: Duration,
    pub error_pause: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60),
            max_restarts: 5,
            max_backoff: Duration::from_secs(3600),
            error_pause: Duration::from_secs(30),
        }
    }
}

impl WatchdogConfig {
    fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            check_interval: env_secs("WATCHDOG_CHECK_INTERVAL_SECS", defaults.check_interval)?,
            max_restarts: env_parse("WATCHDOG_MAX_RESTARTS")?.unwrap_or(defaults.max_restarts),
            max_backoff: env_secs("WATCHDOG_MAX_BACKOFF_SECS", defaults.max_backoff)?,
            error_pause: env_secs("WATCHDOG_ERROR_PAUSE_SECS", defaults.error_pause)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram: TelegramConfig,
    pub api_id: Option<i32>,
    pub api_hash: Option<String>,
    pub data_dir: PathBuf,
    pub log_file: String,
    pub admin_ids: Vec<i64>,
    pub locale: String,
    pub keep_alive_addr: String,
    /// Initial required channel, used only when none has been persisted yet.
    pub required_channel: Option<String>,
    pub watchdog: WatchdogConfig,
}

impl BotConfig {
    /// Loads from the environment. `proxy` comes from the command line.
    pub fn load(proxy: Option<String>) -> Result<Self> {
        let telegram = TelegramConfig::from_env(proxy)?;
        let admin_ids = match env::var("ADMIN_IDS") {
            Ok(raw) => parse_admin_ids(&raw)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            telegram,
            api_id: env_parse("API_ID")?,
            api_hash: env::var("API_HASH").ok().filter(|s| !s.is_empty()),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "logs/chanbot.log".to_string()),
            admin_ids,
            locale: env::var("BOT_LOCALE").unwrap_or_else(|_| DEFAULT_LOCALE.to_string()),
            keep_alive_addr: env::var("KEEP_ALIVE_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            required_channel: env::var("REQUIRED_CHANNEL").ok().filter(|s| !s.is_empty()),
            watchdog: WatchdogConfig::from_env()?,
        })
    }

    /// Checks values that would only fail later at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            anyhow::bail!("BOT_TOKEN is empty");
        }
        if let Some(ref url_str) = self.telegram.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        if let Some(ref proxy) = self.telegram.proxy {
            reqwest::Proxy::all(proxy).with_context(|| format!("invalid proxy URL: {}", proxy))?;
        }
        if !Localizer::available().contains(&self.locale.as_str()) {
            anyhow::bail!(
                "BOT_LOCALE '{}' is not supported (available: {})",
                self.locale,
                Localizer::available().join(", ")
            );
        }
        SocketAddr::from_str(&self.keep_alive_addr)
            .with_context(|| format!("KEEP_ALIVE_ADDR is not a socket address: {}", self.keep_alive_addr))?;
        if self.watchdog.check_interval.is_zero() || self.watchdog.max_restarts == 0 {
            anyhow::bail!("watchdog check interval and max restarts must be positive");
        }
        Ok(())
    }

    /// Both API_ID and API_HASH are set.
    pub fn has_api_credentials(&self) -> bool {
        self.api_id.is_some() && self.api_hash.is_some()
    }

    /// SQLite database holding users and settings.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("chanbot.db")
    }
}

fn parse_admin_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().with_context(|| format!("invalid id in ADMIN_IDS: {}", s)))
        .collect()
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        _ => Ok(None),
    }
}

fn env_secs(key: &str, default: Duration) -> Result<Duration> {
    Ok(env_parse::<u64>(key)?.map_or(default, Duration::from_secs))
}
