use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::normalize::normalize_key;

pub const PLAYER_COLUMN: &str = "Player";
pub const TEAM_COLUMN: &str = "Team";
pub const OPPONENT_COLUMN: &str = "Opponent";
pub const SPORT_COLUMN: &str = "Sport";
pub const TAG_COLUMN: &str = "Tag";
pub const HOME_AWAY_COLUMN: &str = "Home/Away";
pub const GAME_COLUMN: &str = "Game";

/// Columns that are always kept as text, even when the cell looks numeric
const IDENTITY_COLUMNS: &[&str] = &[
    PLAYER_COLUMN,
    TEAM_COLUMN,
    OPPONENT_COLUMN,
    SPORT_COLUMN,
    TAG_COLUMN,
    HOME_AWAY_COLUMN,
    GAME_COLUMN,
    "Matchup",
    "Date",
    "Team Name",
    "Opponent Name",
    "Player Type",
    "Prop Type",
];

/// Returns true when a column holds identity text rather than a measurement
pub fn is_identity_column(name: &str) -> bool {
    IDENTITY_COLUMNS.iter().any(|column| column.eq_ignore_ascii_case(name.trim()))
}

/// Confidence tag assigned upstream to each prop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tag {
    #[serde(rename = "MEGA SMASH")]
    MegaSmash,
    #[serde(rename = "SMASH")]
    Smash,
    #[serde(rename = "GOOD")]
    Good,
    #[serde(rename = "LEAN")]
    Lean,
    #[serde(rename = "FADE/UNDER")]
    FadeUnder,
}

impl Tag {
    /// Every known tag, strongest over first
    pub const ALL: [Tag; 5] = [Tag::MegaSmash, Tag::Smash, Tag::Good, Tag::Lean, Tag::FadeUnder];

    /// Parse a sheet or request value, ignoring case and surrounding whitespace
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        match normalized.as_str() {
            "MEGA SMASH" => Some(Tag::MegaSmash),
            "SMASH" => Some(Tag::Smash),
            "GOOD" => Some(Tag::Good),
            "LEAN" => Some(Tag::Lean),
            "FADE/UNDER" => Some(Tag::FadeUnder),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::MegaSmash => "MEGA SMASH",
            Tag::Smash => "SMASH",
            Tag::Good => "GOOD",
            Tag::Lean => "LEAN",
            Tag::FadeUnder => "FADE/UNDER",
        }
    }

    /// Over-leaning tags feed the "over" side of a lineup
    pub fn is_over(&self) -> bool {
        matches!(self, Tag::MegaSmash | Tag::Smash | Tag::Good)
    }

    /// Under-leaning tags; LEAN only counts when the caller allows it
    pub fn is_under(&self, lean_allowed: bool) -> bool {
        match self {
            Tag::FadeUnder => true,
            Tag::Lean => lean_allowed,
            _ => false,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the matchup the player's team is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeAway {
    Home,
    Away,
}

impl HomeAway {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "home" => Some(HomeAway::Home),
            "away" => Some(HomeAway::Away),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HomeAway::Home => "home",
            HomeAway::Away => "away",
        }
    }
}

/// Sports with a prop sheet behind them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sport {
    Nba,
    Mlb,
}

impl Sport {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "NBA" => Some(Sport::Nba),
            "MLB" => Some(Sport::Mlb),
            _ => None,
        }
    }

    /// Lower-case name, matching the normalized `Sport` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Nba => "nba",
            Sport::Mlb => "mlb",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// A single spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Parse a measurement cell: numbers (including NaN/inf) become `Number`
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return CellValue::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return CellValue::Bool(false);
        }
        match trimmed.parse::<f64>() {
            Ok(number) => CellValue::Number(number),
            Err(_) => CellValue::Text(trimmed.to_string()),
        }
    }

    /// Build an identity cell, never interpreted as a number
    pub fn text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }

    /// Convert a JSON record field into a cell
    pub fn from_json(value: &serde_json::Value, identity: bool) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) if identity => CellValue::Text(n.to_string()),
            serde_json::Value::Number(n) => n.as_f64().map_or(CellValue::Empty, CellValue::Number),
            serde_json::Value::String(s) if identity => CellValue::text(s),
            serde_json::Value::String(s) => CellValue::parse(s),
            other => CellValue::Text(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric view; text cells are parsed, NaN is returned as-is
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Textual view; `None` for empty cells and non-finite numbers
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Number(n) if n.is_finite() => Some(n.to_string()),
            CellValue::Number(_) => None,
            CellValue::Text(s) => Some(s.clone()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            CellValue::Number(_) => serializer.serialize_none(),
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// One prop projection row, with the columns the lineup logic matches on
/// pulled out and normalized
#[derive(Debug, Clone)]
pub struct PropRow {
    /// Player name, trimmed
    pub player: String,

    /// Team abbreviation or name, trimmed
    pub team: String,

    /// Opponent, trimmed
    pub opponent: String,

    /// Sport, lower-cased (e.g. "nba")
    pub sport: Option<String>,

    /// Parsed confidence tag
    pub tag: Option<Tag>,

    /// Parsed home/away indicator
    pub home_away: Option<HomeAway>,

    /// Precomputed matchup string from the sheet, if any
    pub game: Option<String>,

    /// Every raw column of the source row
    pub columns: BTreeMap<String, CellValue>,
}

impl PropRow {
    /// Build a row from its raw columns
    pub fn from_columns(columns: BTreeMap<String, CellValue>) -> Self {
        let text_of = |name: &str| lookup(&columns, name).and_then(CellValue::as_text);

        let player = text_of(PLAYER_COLUMN).unwrap_or_default().trim().to_string();
        let team = text_of(TEAM_COLUMN).unwrap_or_default().trim().to_string();
        let opponent = text_of(OPPONENT_COLUMN).unwrap_or_default().trim().to_string();
        let sport = text_of(SPORT_COLUMN)
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let tag = text_of(TAG_COLUMN).and_then(|t| Tag::parse(&t));
        let home_away = text_of(HOME_AWAY_COLUMN).and_then(|h| HomeAway::parse(&h));
        let game = text_of(GAME_COLUMN).filter(|g| !g.trim().is_empty());

        Self { player, team, opponent, sport, tag, home_away, game, columns }
    }

    /// Key used to deduplicate players
    pub fn player_key(&self) -> String {
        normalize_key(&self.player)
    }

    /// Key used to count team stacking
    pub fn team_key(&self) -> String {
        normalize_key(&self.team)
    }

    /// Look up a column, falling back to a case-insensitive match
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        lookup(&self.columns, column)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(CellValue::as_f64)
    }

    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).and_then(CellValue::as_text)
    }
}

fn lookup<'a>(columns: &'a BTreeMap<String, CellValue>, name: &str) -> Option<&'a CellValue> {
    columns.get(name).or_else(|| {
        columns
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

/// Errors that can occur while loading prop sheets
#[derive(Debug)]
pub enum SheetError {
    /// Sheet file could not be read
    Io(std::io::Error),

    /// Malformed CSV content
    Csv(csv::Error),

    /// Malformed JSON content
    Json(serde_json::Error),

    /// No file exists for the requested sheet
    NotFound(PathBuf),

    /// Content parsed but is not a table of records
    InvalidRecord(String),
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::Io(e) => write!(f, "Failed to read sheet: {e}"),
            SheetError::Csv(e) => write!(f, "Invalid CSV sheet: {e}"),
            SheetError::Json(e) => write!(f, "Invalid JSON sheet: {e}"),
            SheetError::NotFound(path) => write!(f, "Sheet not found: {}", path.display()),
            SheetError::InvalidRecord(msg) => write!(f, "Invalid sheet record: {msg}"),
        }
    }
}

impl std::error::Error for SheetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SheetError::Io(e) => Some(e),
            SheetError::Csv(e) => Some(e),
            SheetError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SheetError {
    fn from(err: std::io::Error) -> Self {
        SheetError::Io(err)
    }
}

impl From<csv::Error> for SheetError {
    fn from(err: csv::Error) -> Self {
        SheetError::Csv(err)
    }
}

impl From<serde_json::Error> for SheetError {
    fn from(err: serde_json::Error) -> Self {
        SheetError::Json(err)
    }
}
