//! Top-N ranking of active members.

use std::cmp::Ordering;
use std::fmt::Write;

use super::{bold, NO_DATA_MESSAGE};
use crate::calculate::total_attacks;
use crate::models::StatsRow;

/// Entries shown when the caller does not ask for a count.
pub const DEFAULT_TOP_COUNT: usize = 5;

/// Result of ranking a statistics table.
#[derive(Debug, Clone, PartialEq)]
pub enum Ranking<'a> {
    /// The table is empty
    NoData,

    /// Nobody in the clan has attacked yet
    NoAttacks,

    /// Attacks exist but no entry could be selected (N was zero)
    Undetermined { total_attacks: u32 },

    /// Best active members, best first
    Ranked {
        total_attacks: u32,
        entries: Vec<&'a StatsRow>,
    },
}

/// Ranking order: average stars, then town hall level, then attack count,
/// all descending.
pub fn compare_rows(a: &StatsRow, b: &StatsRow) -> Ordering {
    b.average_stars
        .total_cmp(&a.average_stars)
        .then_with(|| b.level.cmp(&a.level))
        .then_with(|| b.attack_count.cmp(&a.attack_count))
}

/// Select the `n` best members with at least one attack.
///
/// The sort is stable, so rows tied on every key keep table order.
pub fn rank_top(rows: &[StatsRow], n: usize) -> Ranking<'_> {
    if rows.is_empty() {
        return Ranking::NoData;
    }

    let total_attacks = total_attacks(rows);
    if total_attacks == 0 {
        return Ranking::NoAttacks;
    }

    let mut active: Vec<&StatsRow> = rows.iter().filter(|r| r.is_active()).collect();
    active.sort_by(|a, b| compare_rows(a, b));
    active.truncate(n);

    if active.is_empty() {
        return Ranking::Undetermined { total_attacks };
    }

    Ranking::Ranked {
        total_attacks,
        entries: active,
    }
}

/// Render a ranking as a Markdown chat message.
pub fn render_ranking(ranking: &Ranking<'_>, requested: usize) -> String {
    match ranking {
        Ranking::NoData => NO_DATA_MESSAGE.to_string(),
        Ranking::NoAttacks => "No attacks have been made in the latest war yet.".to_string(),
        Ranking::Undetermined { total_attacks } => format!(
            "{} attacks made in total. Could not determine the top {} players.",
            total_attacks, requested
        ),
        Ranking::Ranked {
            total_attacks,
            entries,
        } => {
            let mut out = format!(
                "🏆 *TOP {} players* ⚔️ (total attacks: {})\n\n",
                entries.len(),
                total_attacks
            );
            for row in entries {
                let _ = writeln!(
                    out,
                    "👤 {} (TH {}):\n   ⭐ {:.1} average stars over {} attacks.",
                    bold(&row.name),
                    row.level,
                    row.average_stars,
                    row.attack_count
                );
            }
            out
        }
    }
}

/// Full `/top` reply: the war window header followed by the ranking.
pub fn top_players_message(rows: &[StatsRow], n: usize) -> String {
    let body = render_ranking(&rank_top(rows, n), n);
    match rows.first() {
        Some(first) => format!("📅 War: {}\n\n{}", first.window, body),
        None => body,
    }
}
