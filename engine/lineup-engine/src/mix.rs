//! Over/under mix tokens

use crate::error::{LineupError, LineupResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of picks in every lineup
pub const LINEUP_SIZE: usize = 6;

/// Required number of over and under picks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MixSpec {
    pub over: usize,
    pub under: usize,
}

impl MixSpec {
    pub fn as_tuple(&self) -> (usize, usize) {
        (self.over, self.under)
    }

    pub fn total(&self) -> usize {
        self.over + self.under
    }
}

/// The seven supported over/under splits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MixType {
    #[serde(rename = "6_OVER")]
    SixOver,
    #[serde(rename = "5_OVER_1_UNDER")]
    FiveOverOneUnder,
    #[serde(rename = "4_OVER_2_UNDER")]
    FourOverTwoUnder,
    #[serde(rename = "3_OVER_3_UNDER")]
    ThreeOverThreeUnder,
    #[serde(rename = "2_OVER_4_UNDER")]
    TwoOverFourUnder,
    #[serde(rename = "1_OVER_5_UNDER")]
    OneOverFiveUnder,
    #[serde(rename = "6_UNDER")]
    SixUnder,
}

impl MixType {
    /// All mixes, from all-over to all-under
    pub const ALL: [MixType; 7] = [
        MixType::SixOver,
        MixType::FiveOverOneUnder,
        MixType::FourOverTwoUnder,
        MixType::ThreeOverThreeUnder,
        MixType::TwoOverFourUnder,
        MixType::OneOverFiveUnder,
        MixType::SixUnder,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            MixType::SixOver => "6_OVER",
            MixType::FiveOverOneUnder => "5_OVER_1_UNDER",
            MixType::FourOverTwoUnder => "4_OVER_2_UNDER",
            MixType::ThreeOverThreeUnder => "3_OVER_3_UNDER",
            MixType::TwoOverFourUnder => "2_OVER_4_UNDER",
            MixType::OneOverFiveUnder => "1_OVER_5_UNDER",
            MixType::SixUnder => "6_UNDER",
        }
    }

    pub fn spec(&self) -> MixSpec {
        let (over, under) = match self {
            MixType::SixOver => (6, 0),
            MixType::FiveOverOneUnder => (5, 1),
            MixType::FourOverTwoUnder => (4, 2),
            MixType::ThreeOverThreeUnder => (3, 3),
            MixType::TwoOverFourUnder => (2, 4),
            MixType::OneOverFiveUnder => (1, 5),
            MixType::SixUnder => (0, 6),
        };
        MixSpec { over, under }
    }

    /// Comma-separated list of every valid token
    pub fn valid_tokens() -> String {
        Self::ALL.iter().map(MixType::token).collect::<Vec<_>>().join(", ")
    }
}

impl FromStr for MixType {
    type Err = LineupError;

    /// Tokens match exactly, case included
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::ALL.iter().copied().find(|mix| mix.token() == token).ok_or_else(|| {
            LineupError::InvalidConfiguration(format!(
                "Invalid mix_type '{token}'. Valid types: {}",
                Self::valid_tokens()
            ))
        })
    }
}

impl fmt::Display for MixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Map a mix token to its over/under counts
pub fn resolve(token: &str) -> LineupResult<MixSpec> {
    token.parse::<MixType>().map(|mix| mix.spec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_tokens() {
        assert_eq!(resolve("3_OVER_3_UNDER").unwrap().as_tuple(), (3, 3));
        assert_eq!(resolve("6_OVER").unwrap().as_tuple(), (6, 0));
        assert_eq!(resolve("6_UNDER").unwrap().as_tuple(), (0, 6));
        assert_eq!(resolve("2_OVER_4_UNDER").unwrap().as_tuple(), (2, 4));
    }

    #[test]
    fn test_resolve_is_exact() {
        assert!(resolve("3_over_3_under").is_err());
        assert!(resolve(" 3_OVER_3_UNDER").is_err());
        assert!(resolve("").is_err());
    }

    #[test]
    fn test_resolve_unknown_token_lists_valid_set() {
        let err = resolve("bogus").unwrap_err();
        let LineupError::InvalidConfiguration(message) = err;
        assert!(message.contains("bogus"));
        for mix in MixType::ALL {
            assert!(message.contains(mix.token()));
        }
    }

    #[test]
    fn test_every_mix_fills_a_lineup() {
        for mix in MixType::ALL {
            assert_eq!(mix.spec().total(), LINEUP_SIZE, "{mix} does not sum to lineup size");
        }
    }

    #[test]
    fn test_serde_uses_tokens() {
        let json = serde_json::to_string(&MixType::FourOverTwoUnder).unwrap();
        assert_eq!(json, "\"4_OVER_2_UNDER\"");
        let mix: MixType = serde_json::from_str("\"1_OVER_5_UNDER\"").unwrap();
        assert_eq!(mix, MixType::OneOverFiveUnder);
    }
}
