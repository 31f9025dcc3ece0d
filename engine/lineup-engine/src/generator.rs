//! Rejection-sampling lineup generator
//!
//! Each attempt draws the required number of over and under picks uniformly
//! without replacement, then throws the draw away if it breaks a lineup rule.
//! Pools are small (tens to low hundreds of rows) and lineups have six picks,
//! so rejection is cheap; the attempt ceiling bounds the worst case when the
//! pool can barely satisfy the mix.

use crate::mix::{MixSpec, LINEUP_SIZE};
use prop_registry::{GameFilter, PropRow, Tag};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info, warn};

/// Upper bound on draws per generation call
pub const MAX_ATTEMPTS: u32 = 500;

/// Random source for one generation call
///
/// Seeded calls are reproducible; unseeded calls draw from OS entropy.
pub fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// An accepted lineup, borrowing its rows from the snapshot
#[derive(Debug, Clone)]
pub struct Lineup<'a> {
    picks: Vec<&'a PropRow>,
}

impl<'a> Lineup<'a> {
    /// Picks in draw order: overs first, then unders
    pub fn picks(&self) -> &[&'a PropRow] {
        &self.picks
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Sorted, deduplicated player keys identifying this lineup
    pub fn key(&self) -> Vec<String> {
        lineup_key(&self.picks)
    }
}

/// Result of one generation call
#[derive(Debug, Clone)]
pub struct GenerationOutcome<'a> {
    pub lineups: Vec<Lineup<'a>>,
    pub attempts: u32,
}

/// Why a draw was thrown away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Rejection {
    WrongSize,
    DuplicatePlayer,
    TeamStack,
    AlreadySeen,
}

/// Generates lineups for one mix from a candidate pool
#[derive(Debug, Clone)]
pub struct LineupGenerator {
    mix: MixSpec,
    max_lineups: usize,
    allowed_tags: BTreeSet<Tag>,
    games: Vec<GameFilter>,
}

impl LineupGenerator {
    /// Generator accepting every tag and every matchup
    pub fn new(mix: MixSpec, max_lineups: usize) -> Self {
        Self { mix, max_lineups, allowed_tags: Tag::ALL.into_iter().collect(), games: Vec::new() }
    }

    /// Restrict the tags picks may carry; LEAN only joins the under side when listed here
    pub fn with_allowed_tags(mut self, allowed_tags: BTreeSet<Tag>) -> Self {
        self.allowed_tags = allowed_tags;
        self
    }

    /// Restrict picks to the given matchups
    pub fn with_games(mut self, games: Vec<GameFilter>) -> Self {
        self.games = games;
        self
    }

    /// Split the pool into over and under buckets
    fn partition<'a>(&self, pool: &[&'a PropRow]) -> (Vec<&'a PropRow>, Vec<&'a PropRow>) {
        let lean_allowed = self.allowed_tags.contains(&Tag::Lean);
        let mut overs = Vec::new();
        let mut unders = Vec::new();

        for &row in pool {
            let Some(tag) = row.tag.filter(|tag| self.allowed_tags.contains(tag)) else {
                continue;
            };
            if !self.games.is_empty() && !self.games.iter().any(|game| game.matches(row)) {
                continue;
            }
            if tag.is_over() {
                overs.push(row);
            } else if tag.is_under(lean_allowed) {
                unders.push(row);
            }
        }

        (overs, unders)
    }

    /// Run the sampling loop
    pub fn run<'a, R: Rng + ?Sized>(
        &self,
        pool: &[&'a PropRow],
        rng: &mut R,
    ) -> GenerationOutcome<'a> {
        let (overs, unders) = self.partition(pool);
        debug!("Pool sizes - over: {}, under: {}", overs.len(), unders.len());

        if overs.len() < self.mix.over || unders.len() < self.mix.under {
            warn!(
                "Pool cannot satisfy mix {}-{} (over: {}, under: {})",
                self.mix.over,
                self.mix.under,
                overs.len(),
                unders.len()
            );
            return GenerationOutcome { lineups: Vec::new(), attempts: 0 };
        }

        let mut lineups = Vec::new();
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        let mut rejections: HashMap<Rejection, u32> = HashMap::new();
        let mut attempts = 0;

        while lineups.len() < self.max_lineups && attempts < MAX_ATTEMPTS {
            attempts += 1;

            let mut picks: Vec<&PropRow> = overs
                .choose_multiple(rng, self.mix.over.min(overs.len()))
                .copied()
                .collect();
            picks.extend(unders.choose_multiple(rng, self.mix.under.min(unders.len())).copied());

            match validate(&picks, &seen) {
                Ok(key) => {
                    seen.insert(key);
                    lineups.push(Lineup { picks });
                }
                Err(reason) => *rejections.entry(reason).or_default() += 1,
            }
        }

        if !rejections.is_empty() {
            debug!("Rejected draws: {:?}", rejections);
        }
        info!("{} lineups generated (from {} attempts)", lineups.len(), attempts);

        GenerationOutcome { lineups, attempts }
    }
}

fn validate(picks: &[&PropRow], seen: &HashSet<Vec<String>>) -> Result<Vec<String>, Rejection> {
    if picks.len() != LINEUP_SIZE {
        return Err(Rejection::WrongSize);
    }

    let mut players = HashSet::with_capacity(picks.len());
    if !picks.iter().all(|row| players.insert(row.player_key())) {
        return Err(Rejection::DuplicatePlayer);
    }

    let mut team_counts: HashMap<String, usize> = HashMap::new();
    for row in picks {
        *team_counts.entry(row.team_key()).or_default() += 1;
    }
    if team_counts.values().any(|&count| count >= LINEUP_SIZE) {
        return Err(Rejection::TeamStack);
    }

    let key = lineup_key(picks);
    if seen.contains(&key) {
        return Err(Rejection::AlreadySeen);
    }

    Ok(key)
}

fn lineup_key(picks: &[&PropRow]) -> Vec<String> {
    let keys: BTreeSet<String> = picks.iter().map(|row| row.player_key()).collect();
    keys.into_iter().collect()
}
