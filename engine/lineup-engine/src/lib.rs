//! LineupEngine - Randomized prop lineup generation
//!
//! Builds a candidate pool from a prop snapshot, resolves the requested
//! over/under mix, and draws unique six-pick lineups by rejection sampling.
//! Generation is synchronous and holds no state between calls, so concurrent
//! requests can run side by side over their own snapshots.

pub mod error;
pub mod generator;
pub mod mix;
pub mod pool;
pub mod request;
pub mod sanitizer;

pub use error::{LineupError, LineupResult};
pub use generator::{seeded_rng, GenerationOutcome, Lineup, LineupGenerator, MAX_ATTEMPTS};
pub use mix::{resolve, MixSpec, MixType, LINEUP_SIZE};
pub use pool::{build_pool, PoolFilter};
pub use request::LineupRequest;
pub use sanitizer::{sanitize_lineup, sanitize_row, sanitize_value, SanitizedLineup, SanitizedRow};

use prop_registry::{GameFilter, PropRow, PropSnapshot, Tag};
use std::collections::BTreeSet;
use tracing::info;

/// Generate up to `max_lineups` lineups for `mix_type` from a candidate pool
///
/// Fails only when `mix_type` is not a known mix; a pool too small for the mix
/// yields an empty result.
pub fn generate<'a, I>(
    pool: I,
    mix_type: &str,
    max_lineups: usize,
    allowed_tags: &BTreeSet<Tag>,
    filter_games: &[String],
    seed: Option<u64>,
) -> LineupResult<Vec<Lineup<'a>>>
where
    I: IntoIterator<Item = &'a PropRow>,
{
    let mix = resolve(mix_type)?;
    let pool: Vec<&PropRow> = pool.into_iter().collect();
    let games = filter_games.iter().map(|game| GameFilter::parse(game)).collect();

    let outcome = LineupGenerator::new(mix, max_lineups)
        .with_allowed_tags(allowed_tags.clone())
        .with_games(games)
        .run(&pool, &mut seeded_rng(seed));

    Ok(outcome.lineups)
}

/// Run a full request against a snapshot and return transport-safe lineups
pub fn generate_from_config(
    request: &LineupRequest,
    snapshot: &PropSnapshot,
) -> LineupResult<Vec<SanitizedLineup>> {
    let mix = resolve(&request.mix_type)?;
    let filter = request.pool_filter();
    let pool = build_pool(snapshot, &filter);
    info!(
        "Generating up to {} lineups for {} from a pool of {} props",
        request.max_lineups,
        request.mix_type,
        pool.len()
    );

    let outcome = LineupGenerator::new(mix, request.max_lineups)
        .with_allowed_tags(filter.allowed_tags)
        .with_games(filter.games)
        .run(&pool, &mut seeded_rng(request.seed));

    Ok(outcome.lineups.iter().map(sanitize_lineup).collect())
}
