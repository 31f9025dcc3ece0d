//! Main PropsGateway implementation

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::rest_api;

use prop_registry::SheetStore;
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tracing::{info, warn};

/// HTTP server for props and lineup generation
pub struct PropsGateway {
    /// Gateway configuration
    config: GatewayConfig,

    /// Sheet locations shared with every request
    store: Arc<SheetStore>,

    /// Sender that stops the running server
    shutdown_tx: Arc<RwLock<Option<oneshot::Sender<()>>>>,

    /// Running state
    is_running: Arc<RwLock<bool>>,
}

impl PropsGateway {
    /// Create a new PropsGateway
    pub fn new(config: GatewayConfig) -> Self {
        let store = Arc::new(SheetStore::new(&config.data.nba_dir, &config.data.mlb_dir));
        Self {
            config,
            store,
            shutdown_tx: Arc::new(RwLock::new(None)),
            is_running: Arc::new(RwLock::new(false)),
        }
    }

    /// Start serving; returns once [`PropsGateway::stop`] is called
    pub async fn start(&self) -> GatewayResult<()> {
        let addr = self.config.server_addr()?;
        info!("Starting PropsGateway on {}", addr);
        info!(
            "Serving sheets from {} (NBA) and {} (MLB)",
            self.config.data.nba_dir.display(),
            self.config.data.mlb_dir.display()
        );

        let routes = rest_api::create_routes(self.store.clone(), &self.config.cors);
        let (tx, rx) = oneshot::channel::<()>();

        let (bound, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(addr, async move {
                let _ = rx.await;
            })
            .map_err(|e| GatewayError::Config(format!("Failed to bind {addr}: {e}")))?;

        {
            let mut shutdown_tx = self.shutdown_tx.write().await;
            *shutdown_tx = Some(tx);
        }
        {
            let mut running = self.is_running.write().await;
            *running = true;
        }

        info!("PropsGateway started successfully on {}", bound);
        server.await;

        {
            let mut running = self.is_running.write().await;
            *running = false;
        }
        info!("PropsGateway stopped accepting connections");
        Ok(())
    }

    /// Stop the PropsGateway, letting in-flight requests finish
    pub async fn stop(&self) -> GatewayResult<()> {
        info!("Stopping PropsGateway...");

        let sender = self.shutdown_tx.write().await.take();
        match sender {
            Some(tx) => {
                if tx.send(()).is_err() {
                    warn!("PropsGateway server already exited");
                }
            }
            None => warn!("PropsGateway was not running"),
        }

        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_start_and_stop() {
        let mut config = GatewayConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;

        let gateway = Arc::new(PropsGateway::new(config));
        let handle = {
            let gateway = gateway.clone();
            tokio::spawn(async move { gateway.start().await })
        };

        for _ in 0..50 {
            if gateway.is_running().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(gateway.is_running().await);

        gateway.stop().await.unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        assert!(result.is_ok());
        assert!(!gateway.is_running().await);
    }

    #[tokio::test]
    async fn test_stop_before_start() {
        let gateway = PropsGateway::new(GatewayConfig::default());
        assert!(gateway.stop().await.is_ok());
        assert!(!gateway.is_running().await);
    }
}
