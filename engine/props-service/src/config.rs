//! Service configuration management

use anyhow::{Context, Result};
use props_gateway::config::{CorsConfig, DataConfig, ServerConfig};
use props_gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the TOML config file
pub const CONFIG_PATH_ENV: &str = "PROPS_CONFIG";

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Cross-origin configuration
    pub cors: CorsConfig,

    /// Sheet locations
    pub data: DataConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl ServiceConfig {
    /// Gateway settings carried by this configuration
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            server: self.server.clone(),
            cors: self.cors.clone(),
            data: self.data.clone(),
        }
    }
}

/// Config file to read: `path` when given, otherwise the one named by `PROPS_CONFIG`
pub fn config_path(path: Option<&Path>) -> Option<PathBuf> {
    path.map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
}

/// Load configuration from files and environment variables
///
/// Without a config file, defaults are used. Environment overrides apply
/// next and `port_override` last, all before validation.
pub fn load_config(path: Option<&Path>, port_override: Option<u16>) -> Result<ServiceConfig> {
    let mut config = match config_path(path) {
        Some(path) => load_from_file(&path)?,
        None => ServiceConfig::default(),
    };

    // Override with environment variables
    apply_overrides(&mut config, |key| std::env::var(key).ok())?;

    if let Some(port) = port_override {
        config.server.port = port;
    }

    // Validate configuration
    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("Invalid config file: {:?}", path))
}

/// Apply `PROPS_*` overrides from `lookup`
pub fn apply_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("PROPS_HOST") {
        config.server.host = host;
    }

    if let Some(port) = lookup("PROPS_PORT") {
        config.server.port =
            port.trim().parse().with_context(|| format!("Invalid PROPS_PORT: {port}"))?;
    }

    if let Some(dir) = lookup("PROPS_NBA_DIR") {
        config.data.nba_dir = PathBuf::from(dir);
    }

    if let Some(dir) = lookup("PROPS_MLB_DIR") {
        config.data.mlb_dir = PathBuf::from(dir);
    }

    if let Some(level) = lookup("PROPS_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Some(format) = lookup("PROPS_LOG_FORMAT") {
        config.logging.format = format;
    }

    if let Some(origins) = lookup("PROPS_CORS_ORIGINS") {
        config.cors.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
    }

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    // Validate log level
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow::anyhow!("Invalid log level: {}", config.logging.level)),
    }

    // Validate log format
    match config.logging.format.as_str() {
        "json" | "pretty" | "compact" => {}
        _ => return Err(anyhow::anyhow!("Invalid log format: {}", config.logging.format)),
    }

    // Validate server port
    if config.server.port == 0 {
        return Err(anyhow::anyhow!("Invalid server port: {}", config.server.port));
    }

    // Validate CORS origins
    for origin in &config.cors.allowed_origins {
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(anyhow::anyhow!("Invalid CORS origin: {}", origin));
        }
    }

    Ok(())
}
