//! Current war outcome summary.

use std::fmt::Write;

use super::bold;
use crate::coc::War;
use crate::fetch::Fetched;
use crate::models::{WarState, WarWindow};

/// Final result of an ended war, from the clan's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarResult {
    Victory,
    Defeat,
    Draw,
}

/// Where the war stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarOutcome {
    Preparation,
    InProgress,
    Ended {
        result: WarResult,
        /// Stars were level and destruction decided
        by_destruction: bool,
    },
}

/// Both sides' scores plus the outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct WarSummary {
    pub outcome: WarOutcome,
    pub clan_name: String,
    pub opponent_name: String,
    pub clan_stars: u32,
    pub opponent_stars: u32,
    pub clan_destruction: f64,
    pub opponent_destruction: f64,
}

impl WarSummary {
    /// Stars as `clan:opponent`.
    pub fn score(&self) -> String {
        format!("{}:{}", self.clan_stars, self.opponent_stars)
    }

    /// Emoji and label describing the outcome.
    pub fn headline(&self) -> (&'static str, String) {
        match self.outcome {
            WarOutcome::Preparation => ("🛡️", format!("Preparation day ({})", self.score())),
            WarOutcome::InProgress => ("⚔️", format!("In progress, battle day ({})", self.score())),
            WarOutcome::Ended {
                result,
                by_destruction,
            } => {
                let suffix = if by_destruction { " by destruction" } else { "" };
                match result {
                    WarResult::Victory => ("🏆", format!("Victory{}! {}", suffix, self.score())),
                    WarResult::Defeat => ("❌", format!("Defeat{} {}", suffix, self.score())),
                    WarResult::Draw => ("🤝", format!("Draw {}", self.score())),
                }
            }
        }
    }
}

/// Summary, or the reason there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum WarReport {
    /// Fetch failed, not in war, or an unrecognized state
    NotAtWar,

    /// A reportable state but a side's data block is missing
    Incomplete,

    Summary(WarSummary),
}

/// Decide the result of an ended war: stars first, then destruction.
pub fn decide(
    clan_stars: u32,
    opponent_stars: u32,
    clan_destruction: f64,
    opponent_destruction: f64,
) -> WarOutcome {
    let (result, by_destruction) = if clan_stars > opponent_stars {
        (WarResult::Victory, false)
    } else if clan_stars < opponent_stars {
        (WarResult::Defeat, false)
    } else if clan_destruction > opponent_destruction {
        (WarResult::Victory, true)
    } else if clan_destruction < opponent_destruction {
        (WarResult::Defeat, true)
    } else {
        (WarResult::Draw, false)
    };

    WarOutcome::Ended {
        result,
        by_destruction,
    }
}

/// Compute the outcome of the current war.
pub fn summarize_war(war: &Fetched<War>) -> WarReport {
    let Fetched::Available(war) = war else {
        return WarReport::NotAtWar;
    };

    let outcome = match war.state() {
        WarState::Preparation => WarOutcome::Preparation,
        WarState::InWar => WarOutcome::InProgress,
        WarState::WarEnded => WarOutcome::Ended {
            result: WarResult::Draw,
            by_destruction: false,
        },
        WarState::NotInWar | WarState::Unknown => return WarReport::NotAtWar,
    };

    let (Some(clan), Some(opponent)) = (&war.clan, &war.opponent) else {
        return WarReport::Incomplete;
    };

    let outcome = match outcome {
        WarOutcome::Ended { .. } => decide(
            clan.stars,
            opponent.stars,
            clan.destruction_percentage,
            opponent.destruction_percentage,
        ),
        other => other,
    };

    WarReport::Summary(WarSummary {
        outcome,
        clan_name: clan.name.clone(),
        opponent_name: opponent.name.clone(),
        clan_stars: clan.stars,
        opponent_stars: opponent.stars,
        clan_destruction: clan.destruction_percentage,
        opponent_destruction: opponent.destruction_percentage,
    })
}

/// Render the `/clanstats` reply.
pub fn render_war_summary(report: &WarReport, window: Option<WarWindow>) -> String {
    let summary = match report {
        WarReport::NotAtWar => return "There is no active clan war right now.".to_string(),
        WarReport::Incomplete => return "Could not fetch complete data about the current war.".to_string(),
        WarReport::Summary(summary) => summary,
    };

    let (emoji, headline) = summary.headline();

    let mut out = format!("📊 *Clan war overview* {}\n\n", emoji);
    if let Some(window) = window {
        let _ = writeln!(out, "📅 *War:* {}", window);
    }
    let _ = writeln!(out, "*{}*\n", headline);
    let _ = writeln!(
        out,
        "{} (VS) {}",
        bold(&summary.clan_name),
        bold(&summary.opponent_name)
    );
    let _ = writeln!(
        out,
        "⭐ Stars: *{}* : *{}*",
        summary.clan_stars, summary.opponent_stars
    );
    let _ = writeln!(
        out,
        "🔨 Destruction: *{:.2}%* : *{:.2}%*",
        summary.clan_destruction, summary.opponent_destruction
    );
    out
}
