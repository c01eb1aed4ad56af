//! Configuration schema definitions.
//!
//! This module defines the routing file structure read by the dispatcher.
//! Keys are camelCase so the same types deserialize from JSON and TOML.

use std::collections::BTreeMap;
use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Root of the routing file.
///
/// `hooks` and `github` are the live route tables. The remaining sections only
/// matter at startup.
#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HookConfig {
    /// Host the dispatcher binds to.
    pub listen_host: String,

    /// Port the dispatcher binds to.
    pub listen_port: u16,

    /// Manually triggered deploy routes.
    pub hooks: Vec<RouteEntry>,

    /// GitHub push-event routes.
    pub github: Vec<GitHubRouteEntry>,

    /// Subprocess settings for the deploy pipeline.
    pub runner: RunnerConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// How often the file is re-parsed.
    pub reload: ReloadMode,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            listen_host: "127.0.0.1".to_string(),
            listen_port: 9000,
            hooks: Vec::new(),
            github: Vec::new(),
            runner: RunnerConfig::default(),
            observability: ObservabilityConfig::default(),
            limits: LimitsConfig::default(),
            reload: ReloadMode::default(),
        }
    }
}

impl HookConfig {
    /// `host:port` string for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }
}

/// A manually triggered deploy target.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    /// Route identifier, echoed back in responses.
    pub id: String,

    /// Exact request path this entry listens on.
    pub path: String,

    /// Hostname used to pick between entries sharing `path`.
    #[serde(default)]
    pub host: Option<String>,

    /// Checkout to deploy.
    #[serde(alias = "dir")]
    pub working_directory: PathBuf,

    /// Branch to reset to.
    pub branch: String,

    /// Supervisor name of the application process.
    #[serde(alias = "process")]
    pub process_name: String,

    /// Expected value of the `X-Webhook-Secret` header.
    pub secret: SecretString,
}

impl RouteEntry {
    /// The deploy target this entry points at.
    pub fn target(&self) -> DeployTarget {
        DeployTarget {
            working_directory: self.working_directory.clone(),
            branch: self.branch.clone(),
            process_name: self.process_name.clone(),
        }
    }
}

/// A family of GitHub-triggered deploys for one repository.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubRouteEntry {
    pub id: String,

    pub path: String,

    /// HMAC-SHA256 key shared with GitHub.
    pub secret: SecretString,

    /// `owner/name`. Empty matches any repository.
    #[serde(default, alias = "repo")]
    pub repository_full_name: String,

    /// Fully-qualified ref (`refs/heads/main`) to deploy target.
    #[serde(default, alias = "map")]
    pub ref_to_target: BTreeMap<String, DeployTarget>,
}

/// Working directory, branch and process a pipeline run acts on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployTarget {
    #[serde(alias = "dir")]
    pub working_directory: PathBuf,

    pub branch: String,

    #[serde(alias = "process")]
    pub process_name: String,
}

/// Subprocess configuration for the deploy pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunnerConfig {
    /// Version-control program.
    pub git: String,

    /// Package installer program.
    pub npm: String,

    /// Argument vector used to restart a process; the process name is appended.
    pub restart_command: Vec<String>,

    /// Upper bound on one full pipeline run, in seconds.
    pub deploy_timeout_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            npm: "npm".to_string(),
            restart_command: vec!["pm2".to_string(), "restart".to_string()],
            deploy_timeout_secs: 600,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9464".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 5 * 1024 * 1024, // 5MB
        }
    }
}

/// Reload policy for the routing file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReloadMode {
    /// Re-read and parse on every request.
    #[default]
    Always,
    /// Re-parse only when modification time or size changes.
    Mtime,
}
