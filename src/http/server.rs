//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (request ID, tracing, body limit)
//! - Bind server to listener
//! - Graceful shutdown on the lifecycle broadcast

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ConfigStore, HookConfig};
use crate::deploy::{DeployExecutor, ProcessRunner, ShellRunner};
use crate::http::handlers::dispatch_handler;
use crate::http::request::MakeRequestUuid;
use crate::observability::tracing::make_request_span;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConfigStore>,
    pub executor: Arc<DeployExecutor>,
}

/// HTTP server for the deploy webhook.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Server running real subprocesses, configured from the startup snapshot.
    pub fn new(config: &HookConfig, store: ConfigStore) -> Self {
        let runner = Arc::new(ShellRunner::new(config.runner.clone()));
        Self::with_runner(config, store, runner)
    }

    /// Server with a custom `ProcessRunner`.
    pub fn with_runner(
        config: &HookConfig,
        store: ConfigStore,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let executor = DeployExecutor::new(
            runner,
            Duration::from_secs(config.runner.deploy_timeout_secs),
        );
        let state = AppState {
            store: Arc::new(store),
            executor: Arc::new(executor),
        };

        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &HookConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
