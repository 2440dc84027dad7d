use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chanbot")]
#[command(about = "Telegram bot with a channel subscription gate, keep-alive endpoint and watchdog", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Proxy for Bot API requests, e.g. socks5://127.0.0.1:9050 (config otherwise from env).
    pub proxy: Option<String>,
}
