use crate::snapshot::PropSnapshot;
use crate::types::{SheetError, Sport};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Sheet with the tagged picks for a sport
pub const ALL_PICKS_SHEET: &str = "All_Picks";

/// NBA game logs for the last ten games
pub const NBA_LAST10_SHEET: &str = "Last10_GameLogs";

/// NBA game logs for the last ten games against the same opponent
pub const NBA_LAST10_VS_OPP_SHEET: &str = "Last10vsOpp_GameLogs";

/// MLB batter game logs
pub const MLB_BATTERS_SHEET: &str = "Last 10 Batters";

/// MLB pitcher game logs
pub const MLB_PITCHERS_SHEET: &str = "Last 10 Pitchers";

const SHEET_EXTENSIONS: [&str; 2] = ["csv", "json"];

/// Per-sport directories of exported sheets
///
/// Each sheet lives in its own file, `<dir>/<Sheet>.csv` or `<dir>/<Sheet>.json`.
/// Sheets are re-read on every call; the store holds no data itself.
#[derive(Debug, Clone)]
pub struct SheetStore {
    nba_dir: PathBuf,
    mlb_dir: PathBuf,
}

impl SheetStore {
    pub fn new(nba_dir: impl Into<PathBuf>, mlb_dir: impl Into<PathBuf>) -> Self {
        Self { nba_dir: nba_dir.into(), mlb_dir: mlb_dir.into() }
    }

    pub fn sport_dir(&self, sport: Sport) -> &Path {
        match sport {
            Sport::Nba => &self.nba_dir,
            Sport::Mlb => &self.mlb_dir,
        }
    }

    /// Resolve the file backing a sheet, preferring CSV over JSON
    pub async fn sheet_path(&self, sport: Sport, sheet: &str) -> Option<PathBuf> {
        let dir = self.sport_dir(sport);
        for ext in SHEET_EXTENSIONS {
            let path = dir.join(format!("{sheet}.{ext}"));
            if let Ok(metadata) = tokio::fs::metadata(&path).await {
                if metadata.is_file() {
                    return Some(path);
                }
            }
        }
        None
    }

    /// Load a required sheet
    pub async fn load_sheet(&self, sport: Sport, sheet: &str) -> Result<PropSnapshot, SheetError> {
        match self.sheet_path(sport, sheet).await {
            Some(path) => PropSnapshot::load_from_file(path).await,
            None => Err(SheetError::NotFound(self.sport_dir(sport).join(sheet))),
        }
    }

    /// Load an enrichment sheet; failures are logged and yield an empty snapshot
    pub async fn load_optional_sheet(&self, sport: Sport, sheet: &str) -> PropSnapshot {
        match self.load_sheet(sport, sheet).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Error loading {} sheet '{}': {}", sport, sheet, e);
                PropSnapshot::new()
            }
        }
    }

    /// Load the tagged picks for a sport
    pub async fn load_picks(&self, sport: Sport) -> Result<PropSnapshot, SheetError> {
        self.load_sheet(sport, ALL_PICKS_SHEET).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[tokio::test]
    async fn test_load_picks_prefers_csv() {
        let nba = tempfile::tempdir().unwrap();
        let mlb = tempfile::tempdir().unwrap();
        write(nba.path(), "All_Picks.csv", "Player,Team,Tag\nA,LAL,SMASH\nB,BOS,GOOD\n");
        write(nba.path(), "All_Picks.json", r#"[{"Player": "C", "Team": "NYK", "Tag": "LEAN"}]"#);

        let store = SheetStore::new(nba.path(), mlb.path());
        let picks = store.load_picks(Sport::Nba).await.unwrap();
        assert_eq!(picks.len(), 2);
    }

    #[tokio::test]
    async fn test_load_picks_from_json() {
        let nba = tempfile::tempdir().unwrap();
        let mlb = tempfile::tempdir().unwrap();
        write(
            mlb.path(),
            "All_Picks.json",
            r#"[{"Player": "Aaron Judge", "Team": "NYY", "Tag": "GOOD"}]"#,
        );

        let store = SheetStore::new(nba.path(), mlb.path());
        let picks = store.load_picks(Sport::Mlb).await.unwrap();
        assert_eq!(picks.len(), 1);
        assert_eq!(picks.rows()[0].player, "Aaron Judge");
    }

    #[tokio::test]
    async fn test_missing_sheets() {
        let nba = tempfile::tempdir().unwrap();
        let mlb = tempfile::tempdir().unwrap();
        let store = SheetStore::new(nba.path(), mlb.path());

        assert!(matches!(store.load_picks(Sport::Nba).await, Err(SheetError::NotFound(_))));
        assert!(store.load_optional_sheet(Sport::Nba, NBA_LAST10_SHEET).await.is_empty());
    }

    #[tokio::test]
    async fn test_sheet_path_skips_directories() {
        let nba = tempfile::tempdir().unwrap();
        let mlb = tempfile::tempdir().unwrap();
        std::fs::create_dir(nba.path().join("All_Picks.csv")).unwrap();
        write(nba.path(), "All_Picks.json", "[]");

        let store = SheetStore::new(nba.path(), mlb.path());
        let path = store.sheet_path(Sport::Nba, ALL_PICKS_SHEET).await.unwrap();
        assert_eq!(path, nba.path().join("All_Picks.json"));
        assert!(store.sheet_path(Sport::Mlb, ALL_PICKS_SHEET).await.is_none());
    }
}
