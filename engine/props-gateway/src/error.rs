//! Error types for the PropsGateway

use lineup_engine::LineupError;
use prop_registry::SheetError;
use serde::Serialize;
use thiserror::Error;
use warp::http::StatusCode;

/// Errors that can occur in the PropsGateway
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Sheet error: {0}")]
    Sheet(#[from] SheetError),

    #[error("{0}")]
    Lineup(#[from] LineupError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Lineup(LineupError::InvalidConfiguration(_))
            | GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code for the error payload
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Sheet(SheetError::NotFound(_)) => "SHEET_NOT_FOUND",
            GatewayError::Sheet(_) => "SHEET_ERROR",
            GatewayError::Lineup(_) => "INVALID_CONFIGURATION",
            GatewayError::BadRequest(_) => "BAD_REQUEST",
            GatewayError::Config(_) => "CONFIG_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.error_code(), self.to_string(), None)
    }
}

impl warp::reject::Reject for GatewayError {}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    pub timestamp: String,
}

/// Error detail
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<serde_json::Value>,
    ) -> Self {
        Self {
            error: ErrorDetail { code: code.into(), message: message.into(), details },
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Result type for PropsGateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
