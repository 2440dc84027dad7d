//! Telegram client config: token, optional Bot API URL and optional proxy.
//! Loaded from BOT_TOKEN and TELEGRAM_API_URL / TELOXIDE_API_URL; the proxy comes from the command line.

use anyhow::{Context, Result};
use std::env;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub telegram_api_url: Option<String>,
    /// `http://`, `https://` or `socks5://` proxy for all Bot API requests.
    pub proxy: Option<String>,
}

impl TelegramConfig {
    /// BOT_TOKEN is required; TELEGRAM_API_URL (or TELOXIDE_API_URL) is optional.
    pub fn from_env(proxy: Option<String>) -> Result<Self> {
        let bot_token = env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?;
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        Ok(Self {
            bot_token,
            telegram_api_url,
            proxy,
        })
    }

    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            telegram_api_url: None,
            proxy: None,
        }
    }

    /// Builds the teloxide client. An invalid API URL is logged and the default endpoint used;
    /// an invalid proxy is an error.
    pub fn build_bot(&self) -> Result<teloxide::Bot> {
        let bot = match &self.proxy {
            Some(proxy) => {
                let client = teloxide::net::default_reqwest_settings()
                    .proxy(reqwest::Proxy::all(proxy).with_context(|| format!("invalid proxy: {}", proxy))?)
                    .build()
                    .context("failed to build HTTP client with proxy")?;
                info!(proxy = %proxy, "Using proxy for Bot API requests");
                teloxide::Bot::with_client(self.bot_token.clone(), client)
            }
            None => teloxide::Bot::new(self.bot_token.clone()),
        };

        let Some(url_str) = &self.telegram_api_url else {
            return Ok(bot);
        };
        match reqwest::Url::parse(url_str) {
            Ok(url) => Ok(bot.set_api_url(url)),
            Err(e) => {
                error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                Ok(bot)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_with_token() {
        let config = TelegramConfig::with_token("test_token".to_string());
        assert_eq!(config.bot_token, "test_token");
        assert!(config.telegram_api_url.is_none());
        assert!(config.proxy.is_none());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_api_url_fallback() {
        env::set_var("BOT_TOKEN", "env_token");
        env::remove_var("TELEGRAM_API_URL");
        env::set_var("TELOXIDE_API_URL", "http://127.0.0.1:8081");

        let config = TelegramConfig::from_env(Some("socks5://127.0.0.1:9050".to_string())).unwrap();

        assert_eq!(config.bot_token, "env_token");
        assert_eq!(config.telegram_api_url.as_deref(), Some("http://127.0.0.1:8081"));
        assert_eq!(config.proxy.as_deref(), Some("socks5://127.0.0.1:9050"));
        env::remove_var("TELOXIDE_API_URL");
    }

    #[test]
    fn test_build_bot_with_api_url_and_proxy() {
        let config = TelegramConfig {
            bot_token: "123:abc".to_string(),
            telegram_api_url: Some("http://127.0.0.1:8081/".to_string()),
            proxy: Some("http://127.0.0.1:3128".to_string()),
        };

        let bot = config.build_bot().unwrap();

        assert_eq!(bot.api_url().as_str(), "http://127.0.0.1:8081/");
    }

    #[test]
    fn test_build_bot_rejects_invalid_proxy() {
        let config = TelegramConfig {
            proxy: Some("not a proxy".to_string()),
            ..TelegramConfig::with_token("123:abc".to_string())
        };

        assert!(config.build_bot().is_err());
    }
}
