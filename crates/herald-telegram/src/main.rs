//! Herald Telegram bot binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx TELEGRAM_CHAT_ID=123 PSN_TOKENS='{"alice":"npsso"}' \
//!     cargo run -p herald-telegram
//! ```

use clap::Parser;
use herald_core::HeraldConfig;
use herald_telegram::HeraldBot;
use tracing_subscriber::EnvFilter;

/// Herald - bridges community presence and trophy activity into Telegram
#[derive(Parser, Debug)]
#[command(name = "herald-telegram")]
#[command(about = "Notification bridge between a community server, PSN trophies and Telegram")]
struct Args {
    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Honor a local .env if present.
    let _ = dotenvy::dotenv();

    let filter = match args.verbose {
        0 => "herald_telegram=info,herald_runtime=info,herald_psn=info,herald_store=info,teloxide=warn",
        1 => "herald_telegram=debug,herald_runtime=debug,herald_psn=debug,herald_store=debug,teloxide=info",
        2 => "herald_telegram=trace,herald_runtime=trace,herald_psn=trace,herald_store=trace,teloxide=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // A partially-configured process must not start.
    let config = match HeraldConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration error");
            return Err(e.into());
        }
    };

    let bot = HeraldBot::new(&config)?;
    bot.run().await?;

    Ok(())
}
