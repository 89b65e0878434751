//! War state and reporting window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Display format for war dates (`15.10.2026`).
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// War lifecycle state as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum WarState {
    Preparation,
    InWar,
    WarEnded,
    NotInWar,
    /// Any value the bot does not recognize
    #[default]
    #[serde(other)]
    Unknown,
}

impl WarState {
    /// Preparation, battle day or ended; the states a war report makes sense for.
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            WarState::Preparation | WarState::InWar | WarState::WarEnded
        )
    }
}

impl std::fmt::Display for WarState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarState::Preparation => write!(f, "preparation"),
            WarState::InWar => write!(f, "inWar"),
            WarState::WarEnded => write!(f, "warEnded"),
            WarState::NotInWar => write!(f, "notInWar"),
            WarState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Reporting period of a statistics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WarWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WarWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A window covering a single day.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Build a window from raw API timestamps.
    ///
    /// Returns `None` if either timestamp is missing or unparseable.
    pub fn from_timestamps(preparation_start: Option<&str>, end: Option<&str>) -> Option<Self> {
        let start = parse_api_date(preparation_start?)?;
        let end = parse_api_date(end?)?;
        Some(Self::new(start, end))
    }
}

impl std::fmt::Display for WarWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start.format(DATE_FORMAT))
        } else {
            write!(
                f,
                "{} - {}",
                self.start.format(DATE_FORMAT),
                self.end.format(DATE_FORMAT)
            )
        }
    }
}

/// Parse the date part of an API timestamp.
///
/// Accepts the compact form the game API emits (`20261015T081500.000Z`) and
/// ISO 8601 (`2026-10-15T08:15:00Z`).
pub fn parse_api_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Some(iso) = s.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
            return Some(date);
        }
    }
    s.get(..8)
        .and_then(|compact| NaiveDate::parse_from_str(compact, "%Y%m%d").ok())
}
