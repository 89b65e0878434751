//! Per-member war statistics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Member, Tag, WarWindow};

/// Attacks counted per member for each war format.
pub const MAX_ATTACKS_PER_FORMAT: usize = 2;

/// Star scores per attacker, in the order the attacks were recorded.
pub type AttackMap = HashMap<Tag, Vec<u32>>;

/// One row of the statistics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRow {
    /// Reporting period
    pub window: WarWindow,

    /// Player display name
    pub name: String,

    /// Town hall level
    pub level: u32,

    /// Regular war stars, zero-padded
    pub cw_attacks: [u32; MAX_ATTACKS_PER_FORMAT],

    /// League war stars, zero-padded
    pub cwl_attacks: [u32; MAX_ATTACKS_PER_FORMAT],

    /// Sum of the four padded scores
    pub total_stars: u32,

    /// Attacks actually made (0..=4)
    pub attack_count: u32,

    /// `total_stars / attack_count`, or 0 with no attacks
    pub average_stars: f64,
}

impl StatsRow {
    /// Build a row from a member's regular and league star sequences.
    ///
    /// Only the first two attacks of each format count.
    pub fn new(window: WarWindow, member: &Member, cw_stars: &[u32], cwl_stars: &[u32]) -> Self {
        let cw_attacks = padded(cw_stars);
        let cwl_attacks = padded(cwl_stars);

        let total_stars = cw_attacks.iter().chain(cwl_attacks.iter()).sum();
        let attack_count = (cw_stars.len().min(MAX_ATTACKS_PER_FORMAT)
            + cwl_stars.len().min(MAX_ATTACKS_PER_FORMAT)) as u32;

        let average_stars = if attack_count > 0 {
            total_stars as f64 / attack_count as f64
        } else {
            0.0
        };

        Self {
            window,
            name: member.name.clone(),
            level: member.town_hall_level,
            cw_attacks,
            cwl_attacks,
            total_stars,
            attack_count,
            average_stars,
        }
    }

    /// True if the member attacked at least once.
    pub fn is_active(&self) -> bool {
        self.attack_count > 0
    }
}

fn padded(stars: &[u32]) -> [u32; MAX_ATTACKS_PER_FORMAT] {
    let mut out = [0; MAX_ATTACKS_PER_FORMAT];
    for (slot, &s) in out.iter_mut().zip(stars) {
        *slot = s;
    }
    out
}
