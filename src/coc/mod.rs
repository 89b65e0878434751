//! Clash of Clans API client.
//!
//! All game API specifics live in this module. The rest of the crate talks to
//! the [`WarDataSource`] trait so tests can drive the pipeline with canned data.

pub mod models;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::fetch::{Fetched, Fetcher};
use crate::models::Tag;

pub use models::{Clan, LeagueGroup, LeagueRound, War, WarAttack, WarClan, WarMember};

/// Read access to one clan's war data.
#[async_trait]
pub trait WarDataSource: Send + Sync {
    /// Clan profile including the member roster.
    async fn clan(&self) -> Fetched<Clan>;

    /// The clan's current regular war.
    async fn current_war(&self) -> Fetched<War>;

    /// The clan's current league group.
    async fn league_group(&self) -> Fetched<LeagueGroup>;

    /// A single league war by its war tag.
    async fn league_war(&self, war_tag: &Tag) -> Fetched<War>;
}

/// API client bound to one clan.
#[derive(Clone)]
pub struct CocClient {
    fetcher: Fetcher,
    clan_tag: Tag,
}

impl CocClient {
    pub fn new(fetcher: Fetcher, clan_tag: Tag) -> Self {
        Self { fetcher, clan_tag }
    }
}

#[async_trait]
impl WarDataSource for CocClient {
    async fn clan(&self) -> Fetched<Clan> {
        debug!("CoC: fetching clan {}", self.clan_tag);
        self.fetcher
            .get_json(&["clans", self.clan_tag.as_str()])
            .await
    }

    async fn current_war(&self) -> Fetched<War> {
        debug!("CoC: fetching current war for {}", self.clan_tag);
        self.fetcher
            .get_json(&["clans", self.clan_tag.as_str(), "currentwar"])
            .await
    }

    async fn league_group(&self) -> Fetched<LeagueGroup> {
        debug!("CoC: fetching league group for {}", self.clan_tag);
        self.fetcher
            .get_json(&[
                "clans",
                self.clan_tag.as_str(),
                "currentwar",
                "leaguegroup",
            ])
            .await
    }

    async fn league_war(&self, war_tag: &Tag) -> Fetched<War> {
        debug!("CoC: fetching league war {}", war_tag);
        self.fetcher
            .get_json(&["clanwarleagues", "wars", war_tag.as_str()])
            .await
    }
}

/// League wars fetched for the current group.
#[derive(Debug, Clone, Default)]
pub struct LeagueWars {
    /// Wars with recorded attacks, in round order
    pub wars: Vec<War>,

    /// Last war with attacks seen while walking the rounds
    pub most_recent: Option<War>,
}

/// Walk every round of the current league group and fetch each drawn war.
///
/// Placeholder `#0` tags are skipped. `most_recent` is overwritten by every
/// war carrying attacks, so it is the last one in round order rather than the
/// one with the latest timestamp.
pub async fn fetch_league_wars(source: &dyn WarDataSource) -> LeagueWars {
    let group = match source.league_group().await {
        Fetched::Available(group) if !group.rounds.is_empty() => group,
        Fetched::Available(_) => {
            debug!("CoC: league group has no rounds");
            return LeagueWars::default();
        }
        Fetched::Unavailable(reason) => {
            debug!("CoC: no league group ({})", reason);
            return LeagueWars::default();
        }
    };

    let mut result = LeagueWars::default();

    for round in &group.rounds {
        for war_tag in &round.war_tags {
            if war_tag.is_placeholder() {
                continue;
            }

            let Fetched::Available(war) = source.league_war(war_tag).await else {
                continue;
            };

            if war.recorded_attacks().is_empty() {
                continue;
            }

            result.most_recent = Some(war.clone());
            result.wars.push(war);
        }
    }

    info!(
        "CoC: {} league wars with attacks across {} rounds",
        result.wars.len(),
        group.rounds.len()
    );
    result
}


#[cfg(test)]
mod tests {
    use super::testing::FakeSource;
    use super::*;
    use crate::fetch::FetcherConfig;

    const GROUP: &str = r##"{"rounds": [
        {"warTags": ["#W1", "#W2"]},
        {"warTags": ["#W3", "#0"]},
        {"warTags": ["#0", "#0"]}
    ]}"##;

    #[tokio::test]
    async fn test_fetch_league_wars_skips_placeholders() {
        let source = FakeSource::default().with_league(
            GROUP,
            &[
                ("#W1", r##"{"state": "warEnded", "attacks": [{"attackerTag": "#P1", "stars": 3}]}"##),
                ("#W3", r##"{"state": "inWar", "attacks": [{"attackerTag": "#P1", "stars": 2}]}"##),
            ],
        );

        let league = fetch_league_wars(&source).await;

        assert_eq!(league.wars.len(), 2);
        let requested = source.requested_wars.lock().unwrap().clone();
        assert_eq!(
            requested,
            vec![Tag::from("#W1"), Tag::from("#W2"), Tag::from("#W3")]
        );
    }

    #[tokio::test]
    async fn test_most_recent_is_last_in_round_order() {
        // #W3 started earlier than #W1 but comes later in the rounds list;
        // the walk keeps the last one seen, not the latest by timestamp.
        let source = FakeSource::default().with_league(
            GROUP,
            &[
                ("#W1", r##"{"state": "warEnded", "preparationStartTime": "20261010T080000.000Z", "attacks": [{"attackerTag": "#P1", "stars": 3}]}"##),
                ("#W3", r##"{"state": "warEnded", "preparationStartTime": "20261001T080000.000Z", "attacks": [{"attackerTag": "#P1", "stars": 1}]}"##),
            ],
        );

        let league = fetch_league_wars(&source).await;
        let most_recent = league.most_recent.unwrap();

        assert_eq!(
            most_recent.preparation_start_time.as_deref(),
            Some("20261001T080000.000Z")
        );
    }

    #[tokio::test]
    async fn test_wars_without_attacks_do_not_replace_most_recent() {
        let source = FakeSource::default().with_league(
            GROUP,
            &[
                ("#W1", r##"{"state": "warEnded", "attacks": [{"attackerTag": "#P1", "stars": 3}]}"##),
                ("#W3", r##"{"state": "preparation"}"##),
            ],
        );

        let league = fetch_league_wars(&source).await;

        assert_eq!(league.wars.len(), 1);
        assert_eq!(
            league.most_recent.unwrap().state(),
            crate::models::WarState::WarEnded
        );
    }

    #[tokio::test]
    async fn test_no_league_group() {
        let source = FakeSource::default();
        let league = fetch_league_wars(&source).await;

        assert!(league.wars.is_empty());
        assert!(league.most_recent.is_none());
    }

    #[tokio::test]
    async fn test_client_without_key_is_unavailable() {
        let fetcher = Fetcher::new(FetcherConfig::default()).unwrap();
        let client = CocClient::new(fetcher, Tag::new("#2LG8PVY8R"));

        assert!(client.clan().await.ok().is_none());
        assert!(client.current_war().await.ok().is_none());
        assert!(client.league_group().await.ok().is_none());
    }
}
