//! Error types for lineup generation

use thiserror::Error;

/// Errors that can occur while generating lineups
///
/// An empty result is not an error; neither is a missing sheet column,
/// which only disables the filter that needed it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineupError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for lineup operations
pub type LineupResult<T> = Result<T, LineupError>;
