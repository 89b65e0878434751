use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clan_war_bot::api::{build_router, state::AppState, webhook_path};
use clan_war_bot::bot::commands::parse_top_count;
use clan_war_bot::bot::{run_polling, Bot, BotCommand, Reply, TelegramClient};
use clan_war_bot::coc::CocClient;
use clan_war_bot::config::AppConfig;
use clan_war_bot::fetch::{Fetcher, FetcherConfig};

#[derive(Parser)]
#[command(name = "clan-war-bot")]
#[command(about = "Clash of Clans clan war statistics bot")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every member's war stats to a spreadsheet
    Stats {
        /// Where to write the spreadsheet
        #[arg(long, default_value = "stats.xlsx")]
        output: PathBuf,
    },

    /// Print the best active members
    Top {
        /// Number of members to show
        count: Option<String>,
    },

    /// Print the current war outcome
    ClanStats,

    /// Answer chat commands using long polling
    Poll,

    /// Answer chat commands via webhook, or polling when no webhook URL is set
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_bot(config: &AppConfig) -> Result<Bot> {
    let fetcher = Fetcher::new(FetcherConfig::from(&config.api)).context("Failed to create fetcher")?;
    if !fetcher.has_credential() {
        tracing::warn!("COC_API_KEY is not set; every command will report missing data");
    }
    let client = CocClient::new(fetcher, config.clan.clan_tag());
    Ok(Bot::new(Arc::new(client)))
}

/// Print text replies and save documents for CLI use.
fn emit(replies: Vec<Reply>, output: Option<&PathBuf>) -> Result<()> {
    for reply in replies {
        match reply {
            Reply::Text(text) => println!("{}\n", text),
            Reply::Document { file_name, bytes } => {
                let path = output.cloned().unwrap_or_else(|| PathBuf::from(&file_name));
                std::fs::write(&path, bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Saved {}", path.display());
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    init_tracing(&config.log_level, cli.json_logs);
    tracing::info!("Starting clan-war-bot v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Tracking clan {}", config.clan.clan_tag());

    let bot = build_bot(&config)?;

    match cli.command {
        Commands::Stats { output } => {
            emit(bot.run(BotCommand::Stats).await, Some(&output))?;
        }
        Commands::Top { count } => {
            let n = parse_top_count(count.as_deref());
            emit(bot.run(BotCommand::Top(n)).await, None)?;
        }
        Commands::ClanStats => {
            emit(bot.run(BotCommand::ClanStats).await, None)?;
        }
        Commands::Poll => {
            let telegram = TelegramClient::new(&config.telegram)?;
            run_polling(&bot, &telegram, config.telegram.poll_timeout_seconds).await?;
        }
        Commands::Serve { host, port } => {
            let telegram = TelegramClient::new(&config.telegram)?;

            let Some(webhook_url) = config.telegram.webhook_url.clone() else {
                tracing::info!("No webhook URL configured, falling back to polling");
                run_polling(&bot, &telegram, config.telegram.poll_timeout_seconds).await?;
                return Ok(());
            };

            // TelegramClient::new already rejected a missing token
            let token = config.telegram.bot_token.clone().unwrap_or_default();
            let hook = format!("{}{}", webhook_url.trim_end_matches('/'), webhook_path(&token));
            telegram
                .set_webhook(&hook)
                .await
                .context("Failed to register webhook")?;

            let state = AppState {
                bot,
                sink: Arc::new(telegram),
                webhook_token: Arc::from(token.as_str()),
            };
            let app = build_router(state);

            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Webhook server listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
