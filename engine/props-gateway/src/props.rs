//! Prop payloads for the frontend
//!
//! Shapes `All_Picks` rows into the display records the frontend expects,
//! enriched with recent game logs. Rows are emitted as JSON objects so that
//! missing and non-finite cells serialize as `null`.

use lineup_engine::sanitize_value;
use prop_registry::game_logs::{appears_in, mlb_last10, nba_last10};
use prop_registry::normalize::matchup;
use prop_registry::{PropRow, PropSnapshot, Tag};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};

/// One shaped prop
pub type PropRecord = Map<String, Value>;

/// Confidence spread across the FADE/UNDER picks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndersConfidence {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}

/// Game-log sheets used to enrich NBA props
#[derive(Debug, Default)]
pub struct NbaLogs {
    pub last10: PropSnapshot,
    pub last10_vs_opp: PropSnapshot,
}

/// Game-log sheets used to enrich MLB props
#[derive(Debug, Default)]
pub struct MlbLogs {
    pub batters: PropSnapshot,
    pub pitchers: PropSnapshot,
}

/// Shape NBA picks; rows without a tag are dropped
pub fn nba_props(picks: &PropSnapshot, logs: &NbaLogs) -> Vec<PropRecord> {
    picks
        .rows()
        .iter()
        .filter(|row| row.text("Tag").is_some_and(|tag| !tag.trim().is_empty()))
        .map(|row| nba_record(row, logs))
        .collect()
}

fn nba_record(row: &PropRow, logs: &NbaLogs) -> PropRecord {
    let prop_type = text_field(row, &["Prop Type", "PropType"]);
    let (last5_vs_season, last10_vs_season) = season_deltas(
        row.number("Season_Avg"),
        row.number("Last5_Avg"),
        row.number("Last10_Avg"),
    );

    let mut record = Map::new();
    record.insert("Player".into(), field(row, &["Player"], json!("")));
    record.insert("Team".into(), field(row, &["Team"], json!("")));
    record.insert("Team Name".into(), field(row, &["Team Name"], json!("")));
    record.insert("Opponent".into(), field(row, &["Opponent"], json!("")));
    record.insert("Opponent Name".into(), field(row, &["Opponent Name"], json!("")));
    record.insert("Player Type".into(), field(row, &["Player Type"], json!("UNKNOWN")));
    record.insert("Prop Type".into(), field(row, &["Prop Type", "PropType"], json!("")));
    record.insert("Prop Value".into(), field(row, &["Prop Value", "PropValue"], json!("")));
    record.insert("Tag".into(), field(row, &["Tag"], json!("")));
    record.insert("MomentumTag".into(), field(row, &["Momentum Tag"], json!("")));
    record.insert("MomentumPattern".into(), field(row, &["Momentum Pattern"], json!("")));
    record.insert("ConfirmedMomentum".into(), field(row, &["Confirmed Momentum"], json!("")));
    record.insert("GuruPotential".into(), field(row, &["Guru Potential"], json!("")));
    record.insert("ZGuruTag".into(), field(row, &["Z-GURU Tag"], json!("")));
    record.insert("GuruConflict".into(), field(row, &["Guru Conflict"], Value::Null));
    record.insert("LeanDirection".into(), field(row, &["Lean Direction"], Value::Null));
    record.insert("Confidence".into(), number(confidence(row)));
    record.insert("RiskNote".into(), field(row, &["Risk Note"], Value::Null));
    record.insert("AI Commentary".into(), field(row, &["AI Commentary"], Value::Null));
    record.insert("GuruPick".into(), field(row, &["Guru Pick"], Value::Null));
    record.insert("GuruMagic".into(), field(row, &["Guru Magic"], Value::Null));
    record.insert("Sport".into(), field(row, &["Sport"], Value::Null));
    record.insert("IsGuruPick".into(), field(row, &["IsGuru Pick"], Value::Null));
    record.insert("WinProbability".into(), field(row, &["WinProbability"], json!(0)));
    record.insert("GameTime".into(), json!(row.text("GameTime").unwrap_or_default()));
    record.insert("Home/Away".into(), field(row, &["Home/Away"], json!("home")));
    record.insert("Matchup".into(), field(row, &["Matchup"], json!(default_matchup(row))));
    record.insert(
        "Final Projection".into(),
        field(row, &["Final Projection", "FinalAdjustedScore"], Value::Null),
    );
    record.insert(
        "Last10Stats".into(),
        json!(nba_last10(&row.player, &prop_type, &logs.last10)),
    );
    record.insert(
        "Last10vsOppStats".into(),
        json!(nba_last10(&row.player, &prop_type, &logs.last10_vs_opp)),
    );
    record.insert("Last5_vs_Season".into(), number(round_to(last5_vs_season, 5)));
    record.insert("Last10_vs_Season".into(), number(round_to(last10_vs_season, 5)));
    record
}

/// Shape MLB picks, inferring batter/pitcher from the game logs when blank
pub fn mlb_props(picks: &PropSnapshot, logs: &MlbLogs) -> Vec<PropRecord> {
    picks.rows().iter().map(|row| mlb_record(row, logs)).collect()
}

fn mlb_record(row: &PropRow, logs: &MlbLogs) -> PropRecord {
    let prop_type = text_field(row, &["Prop Type"]);
    let mut player_type = text_field(row, &["Player Type"]);
    if player_type.is_empty() {
        if appears_in(&logs.batters, &row.player) {
            player_type = "Batter".to_string();
        } else if appears_in(&logs.pitchers, &row.player) {
            player_type = "Pitcher".to_string();
        }
    }

    let game_logs = if player_type == "Batter" { &logs.batters } else { &logs.pitchers };
    let last10 = mlb_last10(&row.player, &prop_type, game_logs);

    let mut record = Map::new();
    record.insert("Player".into(), json!(row.player));
    record.insert("Team".into(), json!(row.team));
    record.insert("Team Name".into(), json!(text_field(row, &["Team Name"])));
    record.insert("Opponent".into(), json!(row.opponent));
    record.insert("Opponent Name".into(), json!(text_field(row, &["Opponent Name"])));
    record.insert("Prop Type".into(), json!(prop_type));
    record.insert("Player Type".into(), json!(player_type));
    record.insert("Prop Value".into(), field(row, &["Prop Value"], json!("")));
    record.insert("Tag".into(), field(row, &["Tag"], json!("")));
    record.insert("Confidence".into(), number(confidence(row)));
    record.insert("WinProbability".into(), field(row, &["WinProbability"], json!("")));
    record.insert("GuruPotential".into(), field(row, &["Guru Potential"], json!("")));
    record.insert("MomentumTag".into(), field(row, &["Momentum Tag"], json!("")));
    record.insert("ZGuruTag".into(), field(row, &["Z-GURU Tag"], json!("")));
    record.insert("GuruConflict".into(), field(row, &["Guru Conflict"], json!("")));
    record.insert("LeanDirection".into(), field(row, &["Lean Direction"], json!("")));
    record.insert("MomentumPattern".into(), field(row, &["Momentum Pattern"], json!("")));
    record.insert("ConfirmedMomentum".into(), field(row, &["Confirmed Momentum"], json!("")));
    record.insert("AI Commentary".into(), field(row, &["AI Commentary"], json!("")));
    record.insert("Sport".into(), field(row, &["Sport"], json!("")));
    record.insert("GuruPick".into(), field(row, &["Guru Pick"], json!("")));
    record.insert("GuruMagic".into(), field(row, &["Guru Magic"], json!("")));
    record.insert("IsGuruPick".into(), field(row, &["IsGuru Pick"], json!("")));
    record.insert("GameTime".into(), field(row, &["GameTime"], json!("")));
    record.insert("Home/Away".into(), field(row, &["Home/Away"], json!("home")));
    record.insert("Matchup".into(), field(row, &["Matchup"], json!(default_matchup(row))));
    record.insert(
        "Final Projection".into(),
        field(row, &["Final Projection", "FinalAdjustedScore"], Value::Null),
    );
    record.insert("Last10Stats".into(), json!(last10));
    record.insert("Last5_vs_Season".into(), field(row, &["Last5_vs_Season"], Value::Null));
    record.insert("Last10_vs_Season".into(), field(row, &["Last10_vs_Season"], Value::Null));
    record.insert("opp_pitcher".into(), field(row, &["opp_pitcher"], json!("")));
    record.insert("opp_era".into(), field(row, &["opp_era"], Value::Null));
    record.insert("opp_hand".into(), field(row, &["opp_hand"], json!("")));
    record
}

/// Min, max and mean raw confidence of the FADE/UNDER picks
pub fn unders_confidence(picks: &PropSnapshot) -> UndersConfidence {
    let values: Vec<f64> = picks
        .rows()
        .iter()
        .filter(|row| row.tag == Some(Tag::FadeUnder))
        .filter_map(|row| row.number("Confidence"))
        .filter(|value| value.is_finite())
        .collect();

    if values.is_empty() {
        return UndersConfidence { min: None, max: None, avg: None };
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    UndersConfidence { min: Some(min), max: Some(max), avg: Some(avg) }
}

/// Confidence on a 0-10 scale
///
/// Fractions are scaled up by ten; a missing or unparsable cell counts as zero.
pub fn normalize_confidence(raw: Option<f64>) -> f64 {
    match raw {
        Some(value) if value <= 1.0 => value * 10.0,
        Some(value) => value,
        None => 0.0,
    }
}

fn confidence(row: &PropRow) -> f64 {
    round_to(normalize_confidence(row.number("Confidence")), 2)
}

/// Relative change of the last-5 and last-10 averages against the season
///
/// When the season average is missing or zero, last-5 is compared against
/// last-10 instead and the last-10 delta is zero.
pub fn season_deltas(season: Option<f64>, last5: Option<f64>, last10: Option<f64>) -> (f64, f64) {
    let nonzero = |value: Option<f64>| value.filter(|v| *v != 0.0);

    match (nonzero(season), nonzero(last10)) {
        (None, Some(last10)) => (last5.map_or(0.0, |l5| (l5 - last10) / last10), 0.0),
        (Some(season), _) => {
            let delta = |value: Option<f64>| nonzero(value).map_or(0.0, |v| (v - season) / season);
            (delta(last5), delta(last10))
        }
        _ => (0.0, 0.0),
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn number(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// First present column among `names`, or `default` when none exist
fn field(row: &PropRow, names: &[&str], default: Value) -> Value {
    names
        .iter()
        .find_map(|name| row.get(name))
        .map_or(default, sanitize_value)
}

fn text_field(row: &PropRow, names: &[&str]) -> String {
    names.iter().find_map(|name| row.text(name)).unwrap_or_default()
}

fn default_matchup(row: &PropRow) -> String {
    matchup(&row.team, &row.opponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NBA_PICKS: &str = "\
Player,Team,Opponent,Tag,Prop Type,Prop Value,Confidence,Season_Avg,Last5_Avg,Last10_Avg,Matchup
LeBron James,LAL,BOS,SMASH,Points,25.5,0.82,25,30,27.5,LAL vs BOS
Jayson Tatum,BOS,LAL,FADE/UNDER,Rebounds,8.5,6.4,0,9,8,
Jrue Holiday,BOS,LAL,FADE/UNDER,Assists,5.5,7.2,,,,
Untagged Guy,NYK,MIA,,Points,10.5,5,,,,
";

    const NBA_LOGS: &str = "\
Player,Date,Team,Opponent,Matchup,Points,Rebounds
LeBron James,2025-03-01,LAL,BOS,LAL vs. BOS,31,8
LeBron James,2025-03-03,LAL,NYK,NYK @ LAL,22,10
";

    #[test]
    fn test_nba_props_shape() {
        let picks = PropSnapshot::from_csv_str(NBA_PICKS).unwrap();
        let logs = NbaLogs {
            last10: PropSnapshot::from_csv_str(NBA_LOGS).unwrap(),
            last10_vs_opp: PropSnapshot::new(),
        };

        let props = nba_props(&picks, &logs);
        assert_eq!(props.len(), 3);

        let lebron = &props[0];
        assert_eq!(lebron["Confidence"], json!(8.2));
        assert_eq!(lebron["Last5_vs_Season"], json!(0.2));
        assert_eq!(lebron["Last10_vs_Season"], json!(0.1));
        assert_eq!(lebron["Player Type"], json!("UNKNOWN"));
        assert_eq!(lebron["Home/Away"], json!("home"));
        assert_eq!(lebron["Matchup"], json!("LAL vs BOS"));

        let stats = lebron["Last10Stats"].as_array().unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0]["Date"], json!("2025-03-03"));
        assert_eq!(stats[0]["Home/Away"], json!("away"));
        assert_eq!(stats[0]["Value"], json!(22.0));
        assert_eq!(stats[1]["Home/Away"], json!("home"));
        assert!(lebron["Last10vsOppStats"].as_array().unwrap().is_empty());

        let tatum = &props[1];
        assert_eq!(tatum["Last5_vs_Season"], json!(0.125));
        assert_eq!(tatum["Last10_vs_Season"], json!(0.0));
        assert!(tatum["Matchup"].is_null());
    }

    #[test]
    fn test_missing_matchup_column_uses_teams() {
        let picks =
            PropSnapshot::from_csv_str("Player,Team,Opponent,Tag\nA,LAL,BOS,GOOD\n").unwrap();
        let props = nba_props(&picks, &NbaLogs::default());
        assert_eq!(props[0]["Matchup"], json!("LAL vs BOS"));
        assert_eq!(props[0]["Confidence"], json!(0.0));
        assert_eq!(props[0]["WinProbability"], json!(0));
    }

    #[test]
    fn test_mlb_player_type_inference() {
        let picks = PropSnapshot::from_csv_str(
            "Player,Team,Opponent,Player Type,Prop Type,Tag,Confidence,opp_pitcher\n\
             Aaron Judge,NYY,BOS,,Hits+Runs+RBIs,GOOD,0.7,Sale\n\
             Gerrit Cole,NYY,BOS,,Pitcher Strikeouts,SMASH,8,\n",
        )
        .unwrap();
        let logs = MlbLogs {
            batters: PropSnapshot::from_csv_str(
                "player,date,team,opponent,hits,runs,rbi\naaron judge,2025-06-01,NYY,BOS,2,1,3\n",
            )
            .unwrap(),
            pitchers: PropSnapshot::from_csv_str(
                "player,date,team,opponent,strikeouts\nGerrit Cole,2025-06-02,NYY,TOR,9\n",
            )
            .unwrap(),
        };

        let props = mlb_props(&picks, &logs);
        assert_eq!(props[0]["Player Type"], json!("Batter"));
        assert_eq!(props[0]["Confidence"], json!(7.0));
        assert_eq!(props[0]["opp_pitcher"], json!("Sale"));
        assert_eq!(props[0]["Last10Stats"][0]["Value"], json!(6.0));
        assert_eq!(props[0]["Last10Stats"][0]["Matchup"], json!("NYY vs. BOS"));

        assert_eq!(props[1]["Player Type"], json!("Pitcher"));
        assert_eq!(props[1]["Last10Stats"][0]["Value"], json!(9.0));
        assert!(props[1]["opp_era"].is_null());
    }

    #[test]
    fn test_unders_confidence() {
        let picks = PropSnapshot::from_csv_str(NBA_PICKS).unwrap();
        let spread = unders_confidence(&picks);
        assert_eq!(spread.min, Some(6.4));
        assert_eq!(spread.max, Some(7.2));
        assert!((spread.avg.unwrap() - 6.8).abs() < 1e-9);

        let empty = unders_confidence(&PropSnapshot::new());
        assert_eq!(empty, UndersConfidence { min: None, max: None, avg: None });
    }

    #[test]
    fn test_season_deltas() {
        assert_eq!(season_deltas(Some(20.0), Some(25.0), Some(22.0)), (0.25, 0.1));
        assert_eq!(season_deltas(None, Some(12.0), Some(10.0)), (0.2, 0.0));
        assert_eq!(season_deltas(Some(0.0), None, Some(10.0)), (0.0, 0.0));
        assert_eq!(season_deltas(None, Some(5.0), None), (0.0, 0.0));
        assert_eq!(season_deltas(Some(10.0), Some(0.0), None), (0.0, 0.0));
    }

    #[test]
    fn test_normalize_confidence() {
        assert_eq!(normalize_confidence(Some(0.75)), 7.5);
        assert_eq!(normalize_confidence(Some(6.2)), 6.2);
        assert_eq!(normalize_confidence(None), 0.0);
    }
}
