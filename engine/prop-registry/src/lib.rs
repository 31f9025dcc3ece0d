//! Prop Registry - Loads prop sheets into immutable snapshots
//!
//! This module reads the exported projection sheets (one file per sheet,
//! CSV or JSON records), normalizes the identity columns used for matching,
//! and provides recent-game enrichment for the props API.

pub mod game_logs;
pub mod normalize;
pub mod snapshot;
pub mod store;
pub mod types;

pub use normalize::{normalize_key, GameFilter};
pub use snapshot::PropSnapshot;
pub use store::SheetStore;
pub use types::{CellValue, HomeAway, PropRow, SheetError, Sport, Tag};
