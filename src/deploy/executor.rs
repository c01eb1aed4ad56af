//! Deploy pipeline execution.
//!
//! # Responsibilities
//! - Run fetch → reset → install → restart against one target
//! - Stop at the first failing step and report its diagnostic output
//! - Serialize pipelines per working directory
//! - Bound each pipeline with a timeout
//!
//! # Design Decisions
//! - The lock is taken before the timeout starts; waiting for another
//!   pipeline on the same target does not eat into this one's budget
//! - Timeout drops the pipeline future, which kills the running child
//! - The pipeline is spawned; a disconnecting caller does not cancel it
//! - Only command exit status is reported, never application health
//! - No retries

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::schema::DeployTarget;
use crate::deploy::locks::TargetLocks;
use crate::deploy::runner::{ProcessRunner, StepOutput};
use crate::observability::metrics;

/// Pipeline steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStep {
    Fetch,
    Reset,
    Install,
    Restart,
}

impl DeployStep {
    pub const ALL: [DeployStep; 4] = [
        DeployStep::Fetch,
        DeployStep::Reset,
        DeployStep::Install,
        DeployStep::Restart,
    ];
}

impl fmt::Display for DeployStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployStep::Fetch => "fetch",
            DeployStep::Reset => "reset",
            DeployStep::Install => "install",
            DeployStep::Restart => "restart",
        };
        f.write_str(name)
    }
}

/// Why a pipeline did not complete.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The step ran and exited non-zero.
    #[error("{step} step failed")]
    StepFailed { step: DeployStep, output: StepOutput },

    /// The step's command could not be started.
    #[error("{step} step could not run: {source}")]
    Spawn {
        step: DeployStep,
        #[source]
        source: std::io::Error,
    },

    #[error("deploy timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The pipeline task panicked or was cancelled by the runtime.
    #[error("deploy task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl DeployError {
    /// Diagnostic text for the response body.
    pub fn details(&self) -> String {
        match self {
            DeployError::StepFailed { step, output } => {
                format!("{} failed: {}", step, output.diagnostic())
            }
            other => other.to_string(),
        }
    }
}

/// Output of a completed pipeline.
#[derive(Debug, Clone, Default)]
pub struct DeployReport {
    pub steps: Vec<(DeployStep, StepOutput)>,
    pub duration: Duration,
}

impl DeployReport {
    /// Combined stdout of every step.
    pub fn stdout(&self) -> String {
        self.steps
            .iter()
            .map(|(_, output)| output.stdout.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Runs the deploy pipeline through a `ProcessRunner`.
pub struct DeployExecutor {
    runner: Arc<dyn ProcessRunner>,
    locks: Arc<TargetLocks>,
    timeout: Duration,
}

impl DeployExecutor {
    pub fn new(runner: Arc<dyn ProcessRunner>, timeout: Duration) -> Self {
        Self {
            runner,
            locks: Arc::new(TargetLocks::new()),
            timeout,
        }
    }

    pub fn locks(&self) -> &TargetLocks {
        &self.locks
    }

    /// Deploy `target`, waiting for any pipeline already running on it.
    ///
    /// The pipeline runs on its own task. Dropping the returned future (a
    /// caller that hung up) abandons the result, not the run.
    pub async fn deploy(&self, target: &DeployTarget) -> Result<DeployReport, DeployError> {
        let task = tokio::spawn(run_locked(
            self.runner.clone(),
            self.locks.clone(),
            self.timeout,
            target.clone(),
        ));
        task.await?
    }
}

async fn run_locked(
    runner: Arc<dyn ProcessRunner>,
    locks: Arc<TargetLocks>,
    timeout: Duration,
    target: DeployTarget,
) -> Result<DeployReport, DeployError> {
    let _guard = locks.acquire(&target.working_directory).await;
    let started = Instant::now();

    tracing::info!(
        dir = %target.working_directory.display(),
        branch = %target.branch,
        process = %target.process_name,
        "Deploy started"
    );

    let result = match tokio::time::timeout(timeout, run_pipeline(runner.as_ref(), &target)).await {
        Ok(result) => result,
        Err(_) => Err(DeployError::Timeout(timeout)),
    };

    let elapsed = started.elapsed();
    match &result {
        Ok(_) => {
            tracing::info!(process = %target.process_name, elapsed_ms = elapsed.as_millis() as u64, "Deploy finished");
            metrics::record_deploy("success", elapsed);
        }
        Err(e) => {
            tracing::error!(process = %target.process_name, error = %e, "Deploy failed");
            let outcome = match e {
                DeployError::Timeout(_) => "timeout",
                _ => "failure",
            };
            metrics::record_deploy(outcome, elapsed);
        }
    }

    result.map(|steps| DeployReport {
        steps,
        duration: elapsed,
    })
}

async fn run_pipeline(
    runner: &dyn ProcessRunner,
    target: &DeployTarget,
) -> Result<Vec<(DeployStep, StepOutput)>, DeployError> {
    let mut steps = Vec::with_capacity(DeployStep::ALL.len());
    for step in DeployStep::ALL {
        let output = run_step(runner, step, target)
            .await
            .map_err(|source| DeployError::Spawn { step, source })?;

        if !output.success() {
            return Err(DeployError::StepFailed { step, output });
        }
        tracing::debug!(step = %step, "Deploy step succeeded");
        steps.push((step, output));
    }
    Ok(steps)
}

async fn run_step(
    runner: &dyn ProcessRunner,
    step: DeployStep,
    target: &DeployTarget,
) -> std::io::Result<StepOutput> {
    let dir = target.working_directory.as_path();
    match step {
        DeployStep::Fetch => runner.fetch(dir).await,
        DeployStep::Reset => runner.reset_hard(dir, &target.branch).await,
        DeployStep::Install => runner.install_dependencies(dir).await,
        DeployStep::Restart => runner.restart_process(&target.process_name).await,
    }
}
