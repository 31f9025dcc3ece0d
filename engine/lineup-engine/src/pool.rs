//! Candidate pool construction
//!
//! Narrows a snapshot down to the rows a lineup may be drawn from. Every
//! filter is optional; a filter whose column is missing from the sheet is
//! skipped with a warning instead of failing the request.

use prop_registry::types::{
    GAME_COLUMN, HOME_AWAY_COLUMN, OPPONENT_COLUMN, SPORT_COLUMN, TAG_COLUMN, TEAM_COLUMN,
};
use prop_registry::{GameFilter, HomeAway, PropRow, PropSnapshot, Tag};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Filters applied to a snapshot before sampling
#[derive(Debug, Clone)]
pub struct PoolFilter {
    /// Tags a row must carry
    pub allowed_tags: BTreeSet<Tag>,

    /// Sports to keep, lower-cased; empty keeps all
    pub sports: BTreeSet<String>,

    /// Home/away side to keep
    pub home_away: Option<HomeAway>,

    /// Matchups to keep; empty keeps all
    pub games: Vec<GameFilter>,
}

impl Default for PoolFilter {
    fn default() -> Self {
        Self {
            allowed_tags: Tag::ALL.into_iter().collect(),
            sports: BTreeSet::new(),
            home_away: None,
            games: Vec::new(),
        }
    }
}

impl PoolFilter {
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.allowed_tags = tags.into_iter().collect();
        self
    }

    pub fn with_sports<S: AsRef<str>>(mut self, sports: impl IntoIterator<Item = S>) -> Self {
        self.sports = sports
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    pub fn with_home_away(mut self, home_away: Option<HomeAway>) -> Self {
        self.home_away = home_away;
        self
    }

    pub fn with_games<S: AsRef<str>>(mut self, games: impl IntoIterator<Item = S>) -> Self {
        self.games = games.into_iter().map(|g| GameFilter::parse(g.as_ref())).collect();
        self
    }
}

/// Select the rows of `snapshot` that pass every active filter
pub fn build_pool<'a>(snapshot: &'a PropSnapshot, filter: &PoolFilter) -> Vec<&'a PropRow> {
    let mut pool: Vec<&PropRow> = snapshot.rows().iter().collect();
    debug!("Building candidate pool from {} rows", pool.len());

    if !filter.sports.is_empty() {
        if snapshot.has_column(SPORT_COLUMN) {
            pool.retain(|row| row.sport.as_ref().is_some_and(|s| filter.sports.contains(s)));
            debug!("{} rows after sport filter {:?}", pool.len(), filter.sports);
        } else {
            warn!("No '{}' column found in dataset, skipping sport filtering", SPORT_COLUMN);
        }
    }

    if let Some(side) = filter.home_away {
        if snapshot.has_column(HOME_AWAY_COLUMN) {
            pool.retain(|row| row.home_away == Some(side));
            debug!("{} rows after {} filter", pool.len(), side.as_str());
        } else {
            warn!(
                "No '{}' column found in dataset, skipping home/away filtering",
                HOME_AWAY_COLUMN
            );
        }
    }

    if !filter.games.is_empty() {
        let has_teams = snapshot.has_column(TEAM_COLUMN) && snapshot.has_column(OPPONENT_COLUMN);
        if has_teams || snapshot.has_column(GAME_COLUMN) {
            pool.retain(|row| filter.games.iter().any(|game| game.matches(row)));
            debug!("{} rows after game filter", pool.len());
        } else {
            warn!("No matchup columns found in dataset, skipping game filtering");
        }
    }

    if snapshot.has_column(TAG_COLUMN) {
        pool.retain(|row| row.tag.is_some_and(|tag| filter.allowed_tags.contains(&tag)));
        debug!("{} rows after tag filter", pool.len());
    } else {
        warn!("No '{}' column found in dataset, skipping tag filtering", TAG_COLUMN);
    }

    pool
}
