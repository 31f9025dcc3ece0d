//! Signal handling for graceful shutdown

use anyhow::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::service::ServiceState;

type ShutdownSender = Arc<Mutex<Option<oneshot::Sender<()>>>>;

/// Setup signal handlers for graceful shutdown
///
/// The returned receiver resolves on the first of Ctrl+C or SIGTERM.
pub fn setup_signal_handlers() -> Result<oneshot::Receiver<()>> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let shutdown_tx: ShutdownSender = Arc::new(Mutex::new(Some(shutdown_tx)));

    // Handle Ctrl+C (SIGINT)
    {
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C signal: {}", e);
                return;
            }

            info!("Ctrl+C signal received");
            notify(&shutdown_tx);
        });
    }

    // Handle SIGTERM (Unix only)
    #[cfg(unix)]
    {
        use signal_hook::consts::SIGTERM;
        use std::sync::atomic::{AtomicBool, Ordering};

        let shutdown_flag = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(SIGTERM, shutdown_flag.clone())?;

        tokio::spawn(async move {
            // Poll for signal
            loop {
                if shutdown_flag.load(Ordering::Relaxed) {
                    info!("SIGTERM signal received");
                    notify(&shutdown_tx);
                    break;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        });
    }

    Ok(shutdown_rx)
}

fn notify(shutdown_tx: &ShutdownSender) {
    let sender = shutdown_tx.lock().ok().and_then(|mut guard| guard.take());
    if let Some(tx) = sender {
        let _ = tx.send(());
    }
}

/// Graceful shutdown handler
pub async fn graceful_shutdown(
    service_state: Arc<ServiceState>,
    gateway_handle: tokio::task::JoinHandle<Result<()>>,
    shutdown_timeout: Duration,
) -> Result<()> {
    info!("Starting graceful shutdown...");

    // Stop the PropsGateway
    if let Err(e) = service_state.stop_gateway().await {
        error!("Failed to stop PropsGateway: {}", e);
    }

    // Wait for the gateway task to complete with timeout
    match timeout(shutdown_timeout, gateway_handle).await {
        Ok(Ok(Ok(()))) => {
            info!("PropsGateway stopped gracefully");
        }
        Ok(Ok(Err(e))) => {
            error!("PropsGateway failed: {:#}", e);
        }
        Ok(Err(e)) => {
            error!("PropsGateway task failed: {}", e);
        }
        Err(_) => {
            warn!("PropsGateway did not stop within timeout, forcing shutdown");
        }
    }

    info!("Graceful shutdown complete");
    Ok(())
}
