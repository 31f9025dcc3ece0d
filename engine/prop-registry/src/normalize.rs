use crate::types::PropRow;

/// Normalize a player or team name for matching and deduplication
///
/// Trims, collapses interior whitespace and lower-cases, so that
/// "  LeBron  James" and "lebron james" compare equal.
pub fn normalize_key(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Matchup string in the "<team> vs <opponent>" form the frontend sends
pub fn matchup(team: &str, opponent: &str) -> String {
    format!("{} vs {}", team.trim(), opponent.trim())
}

/// A matchup filter such as "Lakers vs Celtics", "NYY @ BOS" or "LAL vs BOS (NBA)"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameFilter {
    /// Whole filter string, normalized
    normalized: String,

    /// The two sides of the matchup, normalized
    teams: Option<(String, String)>,

    /// Optional sport qualifier, lower-cased
    sport: Option<String>,
}

impl GameFilter {
    pub fn parse(raw: &str) -> Self {
        let normalized = normalize_key(raw);

        let (body, sport) = match (normalized.rfind(" ("), normalized.ends_with(')')) {
            (Some(open), true) => {
                let sport = normalized[open + 2..normalized.len() - 1].trim().to_string();
                (normalized[..open].to_string(), Some(sport).filter(|s| !s.is_empty()))
            }
            _ => (normalized.clone(), None),
        };

        let teams = split_matchup(&body);

        Self { normalized, teams, sport }
    }

    /// Whether the row belongs to this matchup
    ///
    /// Matches the sheet's precomputed `Game` column verbatim, or the
    /// team/opponent pair in either order when the filter names two teams.
    pub fn matches(&self, row: &PropRow) -> bool {
        if let Some(game) = &row.game {
            if normalize_key(game) == self.normalized {
                return true;
            }
        }

        let Some((a, b)) = &self.teams else {
            return false;
        };

        let team = normalize_key(&row.team);
        let opponent = normalize_key(&row.opponent);
        let pair_matches = (a == &team && b == &opponent) || (a == &opponent && b == &team);
        if !pair_matches {
            return false;
        }

        match &self.sport {
            Some(sport) => row.sport.as_deref() == Some(sport.as_str()),
            None => true,
        }
    }
}

fn split_matchup(body: &str) -> Option<(String, String)> {
    for separator in [" vs. ", " vs ", " @ "] {
        if let Some((left, right)) = body.split_once(separator) {
            let left = left.trim();
            let right = right.trim();
            if !left.is_empty() && !right.is_empty() {
                return Some((left.to_string(), right.to_string()));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;
    use std::collections::BTreeMap;

    fn game_row(team: &str, opponent: &str, sport: &str, game: Option<&str>) -> PropRow {
        let mut columns = BTreeMap::new();
        columns.insert("Team".to_string(), CellValue::text(team));
        columns.insert("Opponent".to_string(), CellValue::text(opponent));
        columns.insert("Sport".to_string(), CellValue::text(sport));
        if let Some(game) = game {
            columns.insert("Game".to_string(), CellValue::text(game));
        }
        PropRow::from_columns(columns)
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  LeBron   James "), "lebron james");
        assert_eq!(normalize_key("BOS"), "bos");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn test_matchup_format() {
        assert_eq!(matchup(" LAL", "BOS "), "LAL vs BOS");
    }

    #[test]
    fn test_filter_matches_either_order() {
        let row = game_row("Golden State Warriors", "Memphis Grizzlies", "NBA", None);

        assert!(GameFilter::parse("Golden State Warriors vs Memphis Grizzlies").matches(&row));
        assert!(GameFilter::parse("memphis grizzlies vs golden state warriors").matches(&row));
        assert!(!GameFilter::parse("Lakers vs Celtics").matches(&row));
    }

    #[test]
    fn test_filter_with_sport_suffix() {
        let row = game_row("LAL", "BOS", "nba", None);

        assert!(GameFilter::parse("LAL vs BOS (NBA)").matches(&row));
        assert!(!GameFilter::parse("LAL vs BOS (MLB)").matches(&row));
    }

    #[test]
    fn test_filter_matches_precomputed_game_column() {
        let row = game_row("NYY", "BOS", "mlb", Some("Yankees @ Red Sox"));

        assert!(GameFilter::parse("yankees @ red sox").matches(&row));
        assert!(!GameFilter::parse("Yankees @ Mets").matches(&row));
    }

    #[test]
    fn test_filter_splits_at_sign_matchups() {
        let row = game_row("NYY", "BOS", "mlb", None);

        assert!(GameFilter::parse("BOS @ NYY").matches(&row));
        assert!(GameFilter::parse("nyy @ bos (MLB)").matches(&row));
        assert!(!GameFilter::parse("NYY @ TOR").matches(&row));
    }

    #[test]
    fn test_filter_without_teams_never_matches_pairs() {
        let row = game_row("LAL", "BOS", "nba", None);
        assert!(!GameFilter::parse("LAL").matches(&row));
    }
}
