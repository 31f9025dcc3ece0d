//! Service state management and component initialization

use anyhow::{anyhow, Context, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::signals::graceful_shutdown;
use props_gateway::PropsGateway;

/// Service state containing all initialized components
pub struct ServiceState {
    /// Service configuration
    pub config: ServiceConfig,

    /// PropsGateway instance
    pub gateway: Arc<PropsGateway>,
}

impl ServiceState {
    /// Create a new service state with all components initialized
    pub fn new(config: ServiceConfig) -> Self {
        info!("Initializing service components...");

        for (sport, dir) in [("NBA", &config.data.nba_dir), ("MLB", &config.data.mlb_dir)] {
            if !dir.is_dir() {
                warn!("{} sheet directory {:?} does not exist yet", sport, dir);
            }
        }

        let gateway = Arc::new(PropsGateway::new(config.gateway_config()));
        Self { config, gateway }
    }

    /// Run the PropsGateway until it is stopped
    pub async fn start_gateway(&self) -> Result<()> {
        self.gateway.start().await.context("PropsGateway failed")
    }

    /// Stop the PropsGateway
    pub async fn stop_gateway(&self) -> Result<()> {
        self.gateway.stop().await.context("Failed to stop PropsGateway")
    }
}

/// Serve until `shutdown` resolves, then stop gracefully
///
/// Fails as soon as the gateway exits on its own, for example when its port
/// cannot be bound.
pub async fn run_until_shutdown<F>(
    service_state: Arc<ServiceState>,
    shutdown: F,
    shutdown_timeout: Duration,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    info!("Starting PropsGateway...");
    let mut gateway_handle = {
        let state = service_state.clone();
        tokio::spawn(async move { state.start_gateway().await })
    };

    tokio::select! {
        _ = shutdown => {
            info!("Shutdown signal received. Initiating graceful shutdown...");
            graceful_shutdown(service_state, gateway_handle, shutdown_timeout).await
        }
        result = &mut gateway_handle => match result {
            Ok(Ok(())) => Err(anyhow!("PropsGateway stopped before a shutdown signal")),
            Ok(Err(e)) => Err(e),
            Err(e) => Err(anyhow!("PropsGateway task failed: {e}")),
        },
    }
}
