//! Statistics calculation engine.
//!
//! Merges regular war and league war attacks into one row per roster member:
//! - Per-member attack maps for each format
//! - War window selection
//! - Row assembly in roster order

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::coc::{fetch_league_wars, War, WarDataSource};
use crate::fetch::Fetched;
use crate::models::{AttackMap, Member, StatsRow, WarWindow};

/// Stars per member from the clan side of a regular war.
pub fn collect_war_attacks(war: &War) -> AttackMap {
    let mut attacks = AttackMap::new();

    if let Some(clan) = &war.clan {
        for member in &clan.members {
            attacks
                .entry(member.tag.clone())
                .or_default()
                .extend(member.attacks.iter().map(|a| a.stars));
        }
    }

    attacks
}

/// Stars per attacker flattened across league wars, in round order.
pub fn collect_league_attacks(wars: &[War]) -> AttackMap {
    let mut attacks = AttackMap::new();

    for war in wars {
        for (tag, stars) in war.recorded_attacks() {
            attacks.entry(tag).or_default().push(stars);
        }
    }

    attacks
}

/// Pick the reporting window.
///
/// The league war wins if it has a state and a preparation start time. The
/// regular war is used next if it is in preparation, in progress or ended and
/// has a preparation start time. Anything else, including unparseable dates,
/// falls back to `today`.
pub fn select_war_window(
    league_war: Option<&War>,
    current_war: Option<&War>,
    today: NaiveDate,
) -> WarWindow {
    let league = league_war
        .filter(|w| w.state.is_some() && w.preparation_start_time.is_some());
    let regular = current_war
        .filter(|w| w.state().is_reportable() && w.preparation_start_time.is_some());

    let Some(target) = league.or(regular) else {
        return WarWindow::single(today);
    };

    match WarWindow::from_timestamps(
        target.preparation_start_time.as_deref(),
        target.end_time.as_deref(),
    ) {
        Some(window) => window,
        None => {
            warn!("Could not parse war dates from API, using today");
            WarWindow::single(today)
        }
    }
}

/// One row per roster member, in roster order.
pub fn build_rows(
    roster: &[Member],
    cw: &AttackMap,
    cwl: &AttackMap,
    window: WarWindow,
) -> Vec<StatsRow> {
    roster
        .iter()
        .map(|member| {
            let cw_stars = cw.get(&member.tag).map(Vec::as_slice).unwrap_or(&[]);
            let cwl_stars = cwl.get(&member.tag).map(Vec::as_slice).unwrap_or(&[]);
            StatsRow::new(window, member, cw_stars, cwl_stars)
        })
        .collect()
}

/// Attacks made by the whole clan.
pub fn total_attacks(rows: &[StatsRow]) -> u32 {
    rows.iter().map(|r| r.attack_count).sum()
}

/// Fetch everything and build the statistics table.
///
/// Returns an empty table when the roster is unavailable or empty.
pub async fn build_stats(source: &dyn WarDataSource, today: NaiveDate) -> Vec<StatsRow> {
    let roster = match source.clan().await {
        Fetched::Available(clan) if !clan.member_list.is_empty() => clan.member_list,
        _ => {
            warn!("Clan roster unavailable or empty");
            return Vec::new();
        }
    };

    let current_war = source.current_war().await.ok();
    let cw = current_war
        .as_ref()
        .map(collect_war_attacks)
        .unwrap_or_default();

    let league = fetch_league_wars(source).await;
    let cwl = collect_league_attacks(&league.wars);

    let window = select_war_window(league.most_recent.as_ref(), current_war.as_ref(), today);
    let rows = build_rows(&roster, &cw, &cwl, window);

    info!(
        "Built stats for {} members ({} attacks) for {}",
        rows.len(),
        total_attacks(&rows),
        window
    );
    rows
}
