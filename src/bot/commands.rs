//! Chat commands and the pipeline behind each of them.

use chrono::NaiveDate;
use tracing::{error, info};

use crate::calculate::build_stats;
use crate::coc::WarDataSource;
use crate::models::WarState;
use crate::report::{
    render_war_summary, render_xlsx, summarize_war, top_players_message, WarReport,
    DEFAULT_TOP_COUNT, EXPORT_FILE_NAME, NO_DATA_MESSAGE,
};

/// A recognized bot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    /// Spreadsheet with every member's stats
    Stats,
    /// Best N active members
    Top(usize),
    /// Current war outcome
    ClanStats,
}

impl BotCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BotCommand::Stats => "stats",
            BotCommand::Top(_) => "top",
            BotCommand::ClanStats => "clanstats",
        }
    }
}

/// Parse a chat message into a command.
///
/// Accepts `/cmd` and `/cmd@BotName`. Only `/top` takes an argument; a
/// missing, non-numeric or zero count falls back to the default.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let mut parts = text.split_whitespace();
    let head = parts.next()?.strip_prefix('/')?;
    let name = head.split('@').next().unwrap_or(head).to_lowercase();

    match name.as_str() {
        "stats" => Some(BotCommand::Stats),
        "top" => Some(BotCommand::Top(parse_top_count(parts.next()))),
        "clanstats" => Some(BotCommand::ClanStats),
        _ => None,
    }
}

/// Parse the `/top` count argument.
pub fn parse_top_count(arg: Option<&str>) -> usize {
    arg.filter(|a| !a.is_empty() && a.chars().all(|c| c.is_ascii_digit()))
        .and_then(|a| a.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_TOP_COUNT)
}

/// Something to send back to the chat.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Markdown text message
    Text(String),
    /// File attachment
    Document { file_name: String, bytes: Vec<u8> },
}

impl Reply {
    pub fn text(s: impl Into<String>) -> Self {
        Reply::Text(s.into())
    }
}

/// Notice sent before the spreadsheet when the war state makes it stale.
pub fn stats_notice(state: WarState) -> Option<&'static str> {
    match state {
        WarState::Preparation => Some(
            "⚠️ *Heads up!* It is *preparation day*. Statistics will be filled with zeros.",
        ),
        WarState::NotInWar => Some(
            "⛔️ *Heads up!* There is *no* active clan war. The statistics file will not change.",
        ),
        _ => None,
    }
}

/// Run one command end to end and collect its replies.
pub async fn execute(
    command: BotCommand,
    source: &dyn WarDataSource,
    today: NaiveDate,
) -> Vec<Reply> {
    info!("Running /{}", command.name());

    match command {
        BotCommand::Stats => stats_replies(source, today).await,
        BotCommand::Top(n) => {
            let rows = build_stats(source, today).await;
            vec![Reply::text(top_players_message(&rows, n))]
        }
        BotCommand::ClanStats => {
            let war = source.current_war().await;
            let report = summarize_war(&war);
            let window = match report {
                WarReport::Summary(_) => build_stats(source, today)
                    .await
                    .first()
                    .map(|row| row.window),
                _ => None,
            };
            vec![Reply::text(render_war_summary(&report, window))]
        }
    }
}

async fn stats_replies(source: &dyn WarDataSource, today: NaiveDate) -> Vec<Reply> {
    let rows = build_stats(source, today).await;
    if rows.is_empty() {
        return vec![Reply::text(NO_DATA_MESSAGE)];
    }

    let mut replies = Vec::new();

    if let Some(war) = source.current_war().await.ok() {
        if let Some(notice) = stats_notice(war.state()) {
            replies.push(Reply::text(notice));
        }
    }

    match render_xlsx(&rows) {
        Ok(bytes) => replies.push(Reply::Document {
            file_name: EXPORT_FILE_NAME.to_string(),
            bytes,
        }),
        Err(e) => {
            error!("Failed to render spreadsheet: {}", e);
            replies.push(Reply::text("⚠️ Could not build the statistics file."));
        }
    }

    replies
}
