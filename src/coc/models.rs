//! Response types for the Clash of Clans API.
//!
//! Only the fields the bot reads are modeled; everything else is ignored.
//! Fields the API may omit are defaulted so partial payloads still decode.

use serde::Deserialize;

use crate::models::{Member, Tag, WarState};

/// `GET /clans/{clanTag}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clan {
    #[serde(default)]
    pub member_list: Vec<Member>,
}

/// A single attack.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarAttack {
    #[serde(default)]
    pub attacker_tag: Option<Tag>,

    #[serde(default)]
    pub stars: u32,
}

/// A war participant and the attacks they made.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarMember {
    pub tag: Tag,

    #[serde(default)]
    pub attacks: Vec<WarAttack>,
}

/// One side of a war.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarClan {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub stars: u32,

    #[serde(default)]
    pub destruction_percentage: f64,

    #[serde(default)]
    pub members: Vec<WarMember>,
}

/// `GET /clans/{clanTag}/currentwar` and `GET /clanwarleagues/wars/{warTag}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct War {
    #[serde(default)]
    pub state: Option<WarState>,

    #[serde(default)]
    pub preparation_start_time: Option<String>,

    #[serde(default)]
    pub end_time: Option<String>,

    #[serde(default)]
    pub clan: Option<WarClan>,

    #[serde(default)]
    pub opponent: Option<WarClan>,

    /// Flat attack log; some league payloads carry it at the top level
    #[serde(default)]
    pub attacks: Vec<WarAttack>,
}

impl War {
    /// Reported state, `Unknown` when absent.
    pub fn state(&self) -> WarState {
        self.state.unwrap_or_default()
    }

    /// Every attack recorded in this war as `(attacker, stars)`, in log order.
    ///
    /// Uses the top-level attack log when present, otherwise both sides'
    /// member attacks.
    pub fn recorded_attacks(&self) -> Vec<(Tag, u32)> {
        if !self.attacks.is_empty() {
            return self
                .attacks
                .iter()
                .filter_map(|a| a.attacker_tag.clone().map(|tag| (tag, a.stars)))
                .collect();
        }

        self.clan
            .iter()
            .chain(self.opponent.iter())
            .flat_map(|side| side.members.iter())
            .flat_map(|m| m.attacks.iter().map(move |a| (m.tag.clone(), a.stars)))
            .collect()
    }
}

/// A league round: the wars drawn for that day.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueRound {
    #[serde(default)]
    pub war_tags: Vec<Tag>,
}

/// `GET /clans/{clanTag}/currentwar/leaguegroup`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueGroup {
    #[serde(default)]
    pub rounds: Vec<LeagueRound>,
}
