//! Configuration for the PropsGateway

use crate::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Main configuration for the PropsGateway
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Cross-origin configuration
    pub cors: CorsConfig,

    /// Sheet locations
    pub data: DataConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Cross-origin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to call the API
    pub allowed_origins: Vec<String>,
}

/// Sheet locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the NBA sheets
    pub nba_dir: PathBuf,

    /// Directory holding the MLB sheets
    pub mlb_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: crate::DEFAULT_PORT }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "https://playswithguru.com".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { nba_dir: PathBuf::from("output/nba"), mlb_dir: PathBuf::from("output/mlb") }
    }
}

impl GatewayConfig {
    /// Get the server address
    pub fn server_addr(&self) -> GatewayResult<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| GatewayError::Config(format!("Invalid server address: {e}")))
    }
}
