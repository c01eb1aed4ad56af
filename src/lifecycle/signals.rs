//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGTERM or SIGINT (Ctrl+C elsewhere)
//! - Trigger `Shutdown` once one arrives
//!
//! # Design Decisions
//! - If the handlers cannot be installed the server keeps running

use std::future::Future;

use crate::lifecycle::Shutdown;

/// Trigger `shutdown` when `signal` resolves successfully.
pub async fn shutdown_on<F>(signal: F, shutdown: Shutdown)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => shutdown.trigger(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install signal handlers");
            std::future::pending::<()>().await;
        }
    }
}

/// Resolve when the process is asked to stop.
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = terminate.recv() => tracing::info!("SIGTERM received"),
        _ = interrupt.recv() => tracing::info!("SIGINT received"),
    }
    Ok(())
}

#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl+C received");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_signal_triggers_shutdown() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();

        shutdown_on(async { Ok(()) }, shutdown).await;

        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_handler_failure_keeps_serving() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();

        let waited = tokio::time::timeout(
            Duration::from_millis(100),
            shutdown_on(async { Err(std::io::Error::other("no signals")) }, shutdown),
        )
        .await;

        assert!(waited.is_err());
        // Closed (sender dropped with the future), never a shutdown message.
        assert!(rx.try_recv().is_err());
    }
}
