//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and the optional metrics exporter
//! - Bind the listener and serve until a signal arrives
//!
//! # Design Decisions
//! - Fail fast: an unreadable routing file at startup is fatal
//! - Listener starts last (traffic only when ready)
//! - CLI `--host`/`--port` override the file's listen settings

use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::TcpListener;

use crate::config::{load_config, ConfigError, ConfigStore};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};

/// Startup parameters gathered from the command line.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub config_path: PathBuf,
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to load {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error(transparent)]
    Logging(#[from] logging::LoggingError),

    #[error("invalid metrics address {0}")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the webhook server until SIGTERM/SIGINT.
pub async fn run(options: StartupOptions) -> Result<(), StartupError> {
    let mut config = load_config(&options.config_path)
        .await
        .map_err(|source| StartupError::Config {
            path: options.config_path.clone(),
            source,
        })?;

    if let Some(host) = options.host {
        config.listen_host = host;
    }
    if let Some(port) = options.port {
        config.listen_port = port;
    }

    logging::init_logging(&config.observability)?;

    let store = ConfigStore::new(options.config_path.clone(), config.reload);
    store.report(&config, &[]);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %options.config_path.display(),
        hooks = config.hooks.len(),
        github_hooks = config.github.len(),
        reload = ?config.reload,
        deploy_timeout_secs = config.runner.deploy_timeout_secs,
        "deploy-hook starting"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    let server = HttpServer::new(&config, store);

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(signals::shutdown_on(signals::wait_for_signal(), shutdown));

    server.run(listener, receiver).await.map_err(StartupError::Serve)?;

    tracing::info!("Shutdown complete");
    Ok(())
}
