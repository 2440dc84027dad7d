use anyhow::Result;
use chanbot::{run_bot, BotConfig, Cli};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = BotConfig::load(cli.proxy)?;
    run_bot(config).await
}
