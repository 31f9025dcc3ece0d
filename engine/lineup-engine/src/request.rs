//! Lineup request configuration
//!
//! Mirrors the JSON body the frontend posts. Deserialization is lenient:
//! list fields that arrive as something other than a list are treated as
//! empty, and an unrecognized home/away value disables that filter.

use crate::mix::MixType;
use crate::pool::PoolFilter;
use prop_registry::{HomeAway, Tag};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

const DEFAULT_MIX_TYPE: &str = "3_OVER_3_UNDER";
const DEFAULT_MAX_LINEUPS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupRequest {
    #[serde(default, deserialize_with = "lenient_home_away")]
    pub home_away: Option<HomeAway>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub filter_tags: Vec<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub filter_games: Vec<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub sports: Vec<String>,

    /// Mix token, resolved when the request is run
    #[serde(default = "default_mix_type")]
    pub mix_type: String,

    #[serde(default = "default_max_lineups", deserialize_with = "lenient_max_lineups")]
    pub max_lineups: usize,

    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for LineupRequest {
    fn default() -> Self {
        Self {
            home_away: None,
            filter_tags: Vec::new(),
            filter_games: Vec::new(),
            sports: Vec::new(),
            mix_type: default_mix_type(),
            max_lineups: DEFAULT_MAX_LINEUPS,
            seed: None,
        }
    }
}

impl LineupRequest {
    pub fn with_mix(mut self, mix: MixType) -> Self {
        self.mix_type = mix.token().to_string();
        self
    }

    /// Tags picks may carry: the requested known tags, or all of them when none were given
    pub fn allowed_tags(&self) -> BTreeSet<Tag> {
        if self.filter_tags.is_empty() {
            return Tag::ALL.into_iter().collect();
        }
        self.filter_tags.iter().filter_map(|raw| Tag::parse(raw)).collect()
    }

    pub fn pool_filter(&self) -> PoolFilter {
        PoolFilter::default()
            .with_tags(self.allowed_tags())
            .with_sports(&self.sports)
            .with_home_away(self.home_away)
            .with_games(&self.filter_games)
    }
}

fn default_mix_type() -> String {
    DEFAULT_MIX_TYPE.to_string()
}

fn default_max_lineups() -> usize {
    DEFAULT_MAX_LINEUPS
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect())
}

fn lenient_home_away<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<HomeAway>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(HomeAway::parse))
}

/// Accepts integers, floats and numeric strings. Negative counts ask for
/// nothing and a fractional count rounds up; anything non-numeric falls back
/// to the default.
fn lenient_max_lineups<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n.as_u64().map(|n| n as usize).or_else(|| n.as_f64().and_then(count)),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(count),
        _ => None,
    };
    Ok(parsed.unwrap_or(DEFAULT_MAX_LINEUPS))
}

fn count(n: f64) -> Option<usize> {
    n.is_finite().then(|| n.max(0.0).ceil() as usize)
}
