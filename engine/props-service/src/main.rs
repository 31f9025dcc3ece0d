//! Props Lineup Production Service
//!
//! Main entry point: loads configuration, starts the PropsGateway, and
//! shuts it down gracefully on Ctrl+C or SIGTERM. Exits with an error if the
//! gateway stops on its own, for example when its port is taken.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use props_service::config::config_path;
use props_service::{
    initialize_logging, load_configuration, run_until_shutdown, setup_signal_handlers,
    ServiceState,
};

/// How long in-flight requests get to finish on shutdown
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "props-service")]
#[command(about = "Serves prop listings and generates lineups over HTTP")]
#[command(version)]
struct Args {
    /// Path to a TOML config file (defaults to $PROPS_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Load configuration
    let config = load_configuration(args.config.as_deref(), args.port)?;

    // Initialize logging
    initialize_logging(&config.logging)?;

    info!(
        "Starting Props Lineup Service v{} (API v{})",
        env!("CARGO_PKG_VERSION"),
        props_gateway::VERSION
    );
    match config_path(args.config.as_deref()) {
        Some(path) => info!("Configuration loaded from {:?}", path),
        None => info!("Configuration loaded from defaults and environment"),
    }

    // Create service state
    let service_state = Arc::new(ServiceState::new(config));
    info!("Service state initialized");

    // Setup signal handlers for graceful shutdown
    let shutdown_signal = setup_signal_handlers().context("Failed to install signal handlers")?;
    info!("Signal handlers configured");

    info!("Props Lineup Service is running. Press Ctrl+C to shutdown gracefully.");
    let shutdown = async move {
        let _ = shutdown_signal.await;
    };
    run_until_shutdown(service_state, shutdown, SHUTDOWN_TIMEOUT).await?;

    info!("Props Lineup Service shutdown complete");
    Ok(())
}
