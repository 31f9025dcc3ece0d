//! Props Lineup Production Service Library
//!
//! This library provides the core functionality for the props service,
//! including configuration management, logging setup, and graceful shutdown handling.

use anyhow::{Context, Result};
use std::path::Path;

pub mod config;
pub mod logging;
pub mod service;
pub mod signals;

pub use config::ServiceConfig;
pub use logging::initialize_logging;
pub use service::{run_until_shutdown, ServiceState};
pub use signals::{graceful_shutdown, setup_signal_handlers};

/// Load configuration from files, environment variables and a CLI port override
pub fn load_configuration(path: Option<&Path>, port: Option<u16>) -> Result<ServiceConfig> {
    config::load_config(path, port).context("Failed to load service configuration")
}
