//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use deploy_hook::config::{load_config, ConfigStore};
use deploy_hook::deploy::{ProcessRunner, StepOutput};
use deploy_hook::http::HttpServer;
use deploy_hook::lifecycle::Shutdown;
use deploy_hook_sdk::HookClient;
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// `ProcessRunner` that records every call instead of spawning processes.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<String>>,
    fail_step: Option<&'static str>,
    delay: Duration,
}

impl RecordingRunner {
    pub fn failing_at(step: &'static str) -> Self {
        Self {
            fail_step: Some(step),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, step: &'static str, call: String) -> std::io::Result<StepOutput> {
        self.calls.lock().unwrap().push(call.clone());
        tokio::time::sleep(self.delay).await;
        if self.fail_step == Some(step) {
            return Ok(StepOutput {
                code: Some(1),
                stdout: String::new(),
                stderr: format!("{} broke", step),
            });
        }
        Ok(StepOutput {
            code: Some(0),
            stdout: call,
            stderr: String::new(),
        })
    }
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn fetch(&self, dir: &Path) -> std::io::Result<StepOutput> {
        self.record("fetch", format!("fetch {}", dir.display())).await
    }

    async fn reset_hard(&self, dir: &Path, branch: &str) -> std::io::Result<StepOutput> {
        self.record("reset", format!("reset {} origin/{}", dir.display(), branch))
            .await
    }

    async fn install_dependencies(&self, dir: &Path) -> std::io::Result<StepOutput> {
        self.record("install", format!("install {}", dir.display())).await
    }

    async fn restart_process(&self, name: &str) -> std::io::Result<StepOutput> {
        self.record("restart", format!("restart {}", name)).await
    }
}

/// A running server bound to an ephemeral port.
pub struct TestServer {
    pub url: String,
    pub client: HookClient,
    pub config_path: PathBuf,
    pub runner: Arc<RecordingRunner>,
    shutdown: Shutdown,
    _dir: TempDir,
}

impl TestServer {
    /// Replace the routing file on disk.
    pub fn rewrite_config(&self, content: &str) {
        std::fs::write(&self.config_path, content).unwrap();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_server(config: Value) -> TestServer {
    start_server_with(config, RecordingRunner::default()).await
}

pub async fn start_server_with(config: Value, runner: RecordingRunner) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("hooks.json");
    std::fs::write(&config_path, serde_json::to_vec_pretty(&config).unwrap()).unwrap();

    let parsed = load_config(&config_path).await.unwrap();
    let runner = Arc::new(runner);
    let store = ConfigStore::new(&config_path, parsed.reload);
    let server = HttpServer::with_runner(&parsed, store, runner.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    TestServer {
        client: HookClient::new(&url),
        url,
        config_path,
        runner,
        shutdown,
        _dir: dir,
    }
}
