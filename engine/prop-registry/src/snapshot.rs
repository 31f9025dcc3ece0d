use crate::normalize::normalize_key;
use crate::types::{is_identity_column, CellValue, PropRow, SheetError};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

/// Immutable, in-memory copy of one prop sheet
///
/// A snapshot is loaded per request and handed down explicitly; nothing
/// mutates it while lineups are generated from it.
#[derive(Debug, Clone, Default)]
pub struct PropSnapshot {
    /// Rows in sheet order
    rows: Vec<PropRow>,

    /// Column names present in the sheet
    columns: BTreeSet<String>,
}

impl PropSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from already-parsed rows
    pub fn from_rows(rows: Vec<PropRow>) -> Self {
        let columns = rows.iter().flat_map(|row| row.columns.keys().cloned()).collect();
        Self { rows, columns }
    }

    /// Parse CSV content with a header row
    pub fn from_csv_str(content: &str) -> Result<Self, SheetError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();

        for record in reader.records() {
            let record = record?;
            let columns: BTreeMap<String, CellValue> = headers
                .iter()
                .zip(record.iter())
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, cell)| (header.clone(), parse_cell(header, cell)))
                .collect();
            rows.push(PropRow::from_columns(columns));
        }

        let columns = headers.into_iter().filter(|h| !h.is_empty()).collect();
        Ok(Self { rows, columns })
    }

    /// Parse a JSON array of records (`[{"Player": ..., ...}, ...]`)
    pub fn from_json_str(content: &str) -> Result<Self, SheetError> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let records = value
            .as_array()
            .ok_or_else(|| SheetError::InvalidRecord("expected a JSON array of records".into()))?;

        let mut rows = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| {
                SheetError::InvalidRecord(format!("record {index} is not an object"))
            })?;
            let columns = object
                .iter()
                .map(|(key, value)| {
                    let key = key.trim().to_string();
                    let cell = CellValue::from_json(value, is_identity_column(&key));
                    (key, cell)
                })
                .collect();
            rows.push(PropRow::from_columns(columns));
        }

        Ok(Self::from_rows(rows))
    }

    /// Load a sheet file, choosing the parser by extension (`.csv` or `.json`)
    pub async fn load_from_file<P: AsRef<Path>>(file_path: P) -> Result<Self, SheetError> {
        let path = file_path.as_ref();
        debug!("Loading prop sheet from: {:?}", path);

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SheetError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(SheetError::Io(e)),
        };

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let snapshot = match extension.as_str() {
            "csv" => Self::from_csv_str(&content)?,
            "json" => Self::from_json_str(&content)?,
            other => {
                return Err(SheetError::InvalidRecord(format!(
                    "unsupported sheet format '{other}' for {}",
                    path.display()
                )));
            }
        };

        info!(
            "Loaded {} rows ({} columns) from {:?}",
            snapshot.len(),
            snapshot.columns.len(),
            path
        );
        Ok(snapshot)
    }

    /// Concatenate several snapshots, keeping row order
    pub fn concat(snapshots: Vec<PropSnapshot>) -> Self {
        let mut merged = Self::new();
        for snapshot in snapshots {
            merged.columns.extend(snapshot.columns);
            merged.rows.extend(snapshot.rows);
        }
        merged
    }

    pub fn rows(&self) -> &[PropRow] {
        &self.rows
    }

    /// Check whether the sheet has a column, ignoring case
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column.trim().eq_ignore_ascii_case(name))
    }

    /// All rows for a player, case-insensitive
    pub fn rows_for_player(&self, player: &str) -> Vec<&PropRow> {
        let key = normalize_key(player);
        self.rows.iter().filter(|row| row.player_key() == key).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn parse_cell(header: &str, raw: &str) -> CellValue {
    if is_identity_column(header) {
        CellValue::text(raw)
    } else {
        CellValue::parse(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tag;
    use std::io::Write;

    const PICKS_CSV: &str = "\
Player,Team,Opponent,Sport,Tag,Home/Away,Confidence,Prop Value
LeBron James,LAL,BOS,NBA,SMASH,home,0.82,25.5
Jayson Tatum,BOS,LAL,NBA,fade/under,away,NaN,27.5
Austin Reaves,LAL,BOS,NBA,,home,,14.5
";

    #[test]
    fn test_csv_parsing() {
        let snapshot = PropSnapshot::from_csv_str(PICKS_CSV).unwrap();

        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.has_column("tag"));
        assert!(!snapshot.has_column("Game"));

        let lebron = &snapshot.rows()[0];
        assert_eq!(lebron.tag, Some(Tag::Smash));
        assert_eq!(lebron.number("Confidence"), Some(0.82));

        let tatum = &snapshot.rows()[1];
        assert_eq!(tatum.tag, Some(Tag::FadeUnder));
        assert!(tatum.number("Confidence").unwrap().is_nan());

        let reaves = &snapshot.rows()[2];
        assert_eq!(reaves.tag, None);
        assert_eq!(reaves.get("Confidence"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_json_parsing() {
        let json = r#"[
            {"Player": "Aaron Judge", "Team": "NYY", "Opponent": "BOS", "Tag": "GOOD", "Confidence": 7.5},
            {"Player": "Rafael Devers", "Team": "BOS", "Opponent": "NYY", "Tag": "LEAN", "Confidence": null}
        ]"#;
        let snapshot = PropSnapshot::from_json_str(json).unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.rows()[0].tag, Some(Tag::Good));
        assert_eq!(snapshot.rows()[1].get("Confidence"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_json_rejects_non_array() {
        let result = PropSnapshot::from_json_str(r#"{"Player": "x"}"#);
        assert!(matches!(result, Err(SheetError::InvalidRecord(_))));
    }

    #[test]
    fn test_concat() {
        let a = PropSnapshot::from_csv_str(PICKS_CSV).unwrap();
        let b = PropSnapshot::from_csv_str("Player,Team,Extra\nAaron Judge,NYY,1\n").unwrap();
        let merged = PropSnapshot::concat(vec![a, b]);

        assert_eq!(merged.len(), 4);
        assert!(merged.has_column("Extra"));
        assert_eq!(merged.rows().iter().filter(|row| row.tag.is_some()).count(), 2);
    }

    #[test]
    fn test_rows_for_player() {
        let snapshot = PropSnapshot::from_csv_str(PICKS_CSV).unwrap();
        assert_eq!(snapshot.rows_for_player("  lebron JAMES").len(), 1);
        assert!(snapshot.rows_for_player("Nobody").is_empty());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("All_Picks.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(PICKS_CSV.as_bytes()).unwrap();

        let snapshot = PropSnapshot::load_from_file(&path).await.unwrap();
        assert_eq!(snapshot.len(), 3);

        let missing = PropSnapshot::load_from_file(dir.path().join("Missing.csv")).await;
        assert!(matches!(missing, Err(SheetError::NotFound(_))));
    }
}
