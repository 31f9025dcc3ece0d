//! Recent-game enrichment for props
//!
//! Looks up a player's most recent games in a game-log sheet and extracts the
//! statistic the prop is written on (e.g. "Pts+Rebs" sums two columns).

use crate::snapshot::PropSnapshot;
use crate::types::{CellValue, PropRow};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::cmp::Reverse;
use tracing::warn;

/// How many recent games are attached to each prop
pub const RECENT_GAMES: usize = 10;

/// How a prop type's value is derived from a game-log row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatDef {
    Column(&'static str),
    Sum(&'static [&'static str]),
    Difference(&'static str, &'static str),
}

impl StatDef {
    /// Evaluate against a row; absent cells count as zero
    fn evaluate_lenient(&self, row: &PropRow) -> Option<f64> {
        let value = |column: &str| row.number(column).filter(|n| !n.is_nan()).unwrap_or(0.0);
        let result = match self {
            StatDef::Column(column) => row.number(column).unwrap_or(0.0),
            StatDef::Sum(columns) => columns.iter().map(|c| value(c)).sum(),
            StatDef::Difference(a, b) => value(a) - value(b),
        };
        Some(result).filter(|n| n.is_finite())
    }
}

/// NBA prop type to game-log column mapping
pub fn nba_stat(prop_type: &str) -> Option<StatDef> {
    let stat = match prop_type.trim() {
        "Points" => StatDef::Column("Points"),
        "Rebounds" => StatDef::Column("Rebounds"),
        "Assists" => StatDef::Column("Assists"),
        "Pts+Rebs" => StatDef::Sum(&["Points", "Rebounds"]),
        "Pts+Asts" => StatDef::Sum(&["Points", "Assists"]),
        "Rebs+Asts" => StatDef::Sum(&["Rebounds", "Assists"]),
        "Pts+Rebs+Asts" => StatDef::Sum(&["Points", "Rebounds", "Assists"]),
        "3-PT Attempted" => StatDef::Column("3PT Attempted"),
        "3-PT Made" => StatDef::Column("3PT Made"),
        "Turnovers" => StatDef::Column("Turnovers"),
        "Blocked Shots" => StatDef::Column("Blocks"),
        "Steals" => StatDef::Column("Steals"),
        "Free Throws Attempted" => StatDef::Column("Free Throws Attempted"),
        "Free Throws Made" => StatDef::Column("Free Throws Made"),
        "Offensive Rebounds" => StatDef::Column("OREB"),
        "Defensive Rebounds" => StatDef::Column("DREB"),
        "Personal Fouls" => StatDef::Column("PF"),
        "Fantasy Score" => StatDef::Column("FantasyScore_PP"),
        "FG Attempted" => StatDef::Column("Field Goals Attempted"),
        "FG Made" => StatDef::Column("Field Goals Made"),
        "Two Pointers Made" => StatDef::Difference("Field Goals Made", "3PT Made"),
        "Two Pointers Attempted" => StatDef::Difference("Field Goals Attempted", "3PT Attempted"),
        _ => return None,
    };
    Some(stat)
}

/// MLB prop type to (lower-case) game-log column mapping
pub fn mlb_stat(prop_type: &str) -> Option<StatDef> {
    let stat = match prop_type.trim() {
        "Hits+Runs+RBIs" => StatDef::Sum(&["hits", "runs", "rbi"]),
        "Hits" | "Hits Allowed" => StatDef::Column("hits"),
        "Runs" | "Earned Runs Allowed" => StatDef::Column("runs"),
        "RBIs" => StatDef::Column("rbi"),
        "Home Runs" => StatDef::Column("homeruns"),
        "Pitcher Strikeouts" | "Hitter Strikeouts" => StatDef::Column("strikeouts"),
        "Pitcher Fantasy Score" | "Hitter Fantasy Score" => StatDef::Column("pp_fantasy"),
        "Total Bases" => StatDef::Column("totalbases"),
        "Stolen Bases" => StatDef::Column("stolenbases"),
        "Walks" | "Walks Allowed" => StatDef::Column("baseonballs"),
        "Doubles" => StatDef::Column("doubles"),
        "Triples" => StatDef::Column("triples"),
        "Singles" => StatDef::Column("singles"),
        "Pitching Outs" => StatDef::Column("outs"),
        "Pitches Thrown" => StatDef::Column("numberofpitches"),
        _ => return None,
    };
    Some(stat)
}

/// One NBA game in a prop's recent history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NbaGameLog {
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "Opponent")]
    pub opponent: String,
    #[serde(rename = "Home/Away")]
    pub home_away: String,
    #[serde(rename = "Matchup")]
    pub matchup: String,
    #[serde(rename = "Value")]
    pub value: Option<f64>,
}

/// One MLB game in a prop's recent history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MlbGameLog {
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Opponent")]
    pub opponent: String,
    #[serde(rename = "HomeAway")]
    pub home_away: String,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "Matchup")]
    pub matchup: String,
    #[serde(rename = "Value")]
    pub value: Option<f64>,
}

/// A player's most recent games, newest first
pub fn recent_games<'a>(logs: &'a PropSnapshot, player: &str, limit: usize) -> Vec<&'a PropRow> {
    let mut games = logs.rows_for_player(player);
    // Undated rows sort after every dated one
    games.sort_by_key(|row| Reverse(row.get("Date").and_then(parse_date)));
    games.truncate(limit);
    games
}

/// Last ten NBA games for a prop
pub fn nba_last10(player: &str, prop_type: &str, logs: &PropSnapshot) -> Vec<NbaGameLog> {
    if logs.is_empty() {
        return Vec::new();
    }

    let stat = nba_stat(prop_type);
    recent_games(logs, player, RECENT_GAMES)
        .into_iter()
        .map(|row| {
            let team = row.team.clone();
            let matchup = row.text("Matchup").unwrap_or_default();
            let home_away = if matchup.starts_with(&team) { "home" } else { "away" };
            NbaGameLog {
                date: row.get("Date").and_then(parse_date).map(format_date),
                opponent: row.opponent.clone(),
                home_away: home_away.to_string(),
                matchup,
                value: stat.and_then(|s| s.evaluate_lenient(row)).map(round2),
                team,
            }
        })
        .collect()
}

/// Last ten MLB games for a prop
pub fn mlb_last10(player: &str, prop_type: &str, logs: &PropSnapshot) -> Vec<MlbGameLog> {
    if logs.is_empty() {
        return Vec::new();
    }

    let games = recent_games(logs, player, RECENT_GAMES);
    if games.is_empty() {
        return Vec::new();
    }

    let stat = mlb_stat(prop_type);
    let resolvable = match stat {
        Some(StatDef::Column(column)) => logs.has_column(column),
        Some(_) => true,
        None => false,
    };
    if !resolvable {
        warn!("Stat column not found for {} - {}", player, prop_type);
    }

    games
        .into_iter()
        .map(|row| {
            let team = row.team.clone();
            let opponent = row.opponent.clone();
            let value = if resolvable {
                stat.and_then(|s| match s {
                    StatDef::Column(column) => row.number(column).filter(|n| n.is_finite()),
                    other => other.evaluate_lenient(row),
                })
            } else {
                None
            };
            MlbGameLog {
                date: row.get("Date").and_then(parse_date).map(format_date),
                home_away: row.text("Home/Away").unwrap_or_else(|| "Home".to_string()),
                matchup: row
                    .text("Matchup")
                    .unwrap_or_else(|| format!("{team} vs. {opponent}")),
                value: value.map(round2),
                opponent,
                team,
            }
        })
        .collect()
}

/// Whether a player appears in a game-log sheet
pub fn appears_in(logs: &PropSnapshot, player: &str) -> bool {
    !logs.rows_for_player(player).is_empty()
}

/// Parse a sheet date: ISO text (optionally with a time part), US-style
/// text, or an Excel serial day number
pub fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Text(text) => {
            let text = text.trim();
            let date_part = text.get(..10).unwrap_or(text);
            NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .or_else(|_| NaiveDate::parse_from_str(text, "%m/%d/%Y"))
                .ok()
        }
        CellValue::Number(serial) if serial.is_finite() && *serial > 0.0 => {
            NaiveDate::from_ymd_opt(1899, 12, 30)
                .and_then(|epoch| epoch.checked_add_signed(Duration::days(serial.trunc() as i64)))
        }
        _ => None,
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const NBA_LOGS: &str = "\
Player,Date,Team,Opponent,Matchup,Points,Rebounds,Field Goals Made,3PT Made
LeBron James,2025-03-01,LAL,BOS,LAL vs. BOS,30,8,12,3
LeBron James,2025-03-03,LAL,NYK,LAL @ NYK,24,10,9,2
LeBron James,2025-02-27,LAL,MIA,MIA vs. LAL,,7,8,1
Jayson Tatum,2025-03-01,BOS,LAL,BOS @ LAL,28,9,10,4
";

    const MLB_BATTERS: &str = "\
player,date,team,opponent,home/away,hits,runs,rbi
Aaron Judge,2025-06-01,NYY,BOS,Home,2,1,3
Aaron Judge,2025-06-02,NYY,BOS,Away,0,0,0
";

    #[test]
    fn test_recent_games_newest_first() {
        let logs = PropSnapshot::from_csv_str(NBA_LOGS).unwrap();
        let games = recent_games(&logs, "lebron james", 2);

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].opponent, "NYK");
        assert_eq!(games[1].opponent, "BOS");
    }

    #[test]
    fn test_nba_sum_and_home_away() {
        let logs = PropSnapshot::from_csv_str(NBA_LOGS).unwrap();
        let games = nba_last10("LeBron James", "Pts+Rebs", &logs);

        assert_eq!(games.len(), 3);
        assert_eq!(games[0].value, Some(34.0));
        assert_eq!(games[0].home_away, "home");
        assert_eq!(games[0].date.as_deref(), Some("2025-03-03"));
        // Missing points count as zero in a sum
        assert_eq!(games[2].value, Some(7.0));
        assert_eq!(games[2].home_away, "away");
    }

    #[test]
    fn test_nba_difference_and_unknown_prop() {
        let logs = PropSnapshot::from_csv_str(NBA_LOGS).unwrap();

        let twos = nba_last10("Jayson Tatum", "Two Pointers Made", &logs);
        assert_eq!(twos[0].value, Some(6.0));

        let unknown = nba_last10("Jayson Tatum", "Dunks", &logs);
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].value, None);
    }

    #[test]
    fn test_mlb_lowercase_columns() {
        let logs = PropSnapshot::from_csv_str(MLB_BATTERS).unwrap();
        let games = mlb_last10("Aaron Judge", "Hits+Runs+RBIs", &logs);

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].date.as_deref(), Some("2025-06-02"));
        assert_eq!(games[0].home_away, "Away");
        assert_eq!(games[1].value, Some(6.0));
        assert_eq!(games[1].matchup, "NYY vs. BOS");

        let missing_column = mlb_last10("Aaron Judge", "Home Runs", &logs);
        assert!(missing_column.iter().all(|g| g.value.is_none()));
    }

    #[test]
    fn test_parse_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1);
        assert_eq!(parse_date(&CellValue::text("2025-03-01")), expected);
        assert_eq!(parse_date(&CellValue::text("2025-03-01 19:30:00")), expected);
        assert_eq!(parse_date(&CellValue::text("03/01/2025")), expected);
        assert_eq!(parse_date(&CellValue::Number(45717.0)), expected);
        assert_eq!(parse_date(&CellValue::Empty), None);
    }

    #[test]
    fn test_appears_in() {
        let logs = PropSnapshot::from_csv_str(MLB_BATTERS).unwrap();
        assert!(appears_in(&logs, "aaron judge"));
        assert!(!appears_in(&logs, "Gerrit Cole"));
    }
}
