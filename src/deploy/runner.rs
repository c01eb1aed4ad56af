//! Subprocess capability used by the deploy pipeline.
//!
//! # Responsibilities
//! - Build the git / npm / supervisor command lines
//! - Capture exit code, stdout and stderr of each step
//!
//! # Design Decisions
//! - The only place command strings are assembled; everything else goes
//!   through the `ProcessRunner` trait so tests can substitute a mock
//! - No shell: arguments are passed as a vector, branch and process names
//!   never pass through `sh -c`
//! - Children are killed when their future is dropped (pipeline timeout)

use std::fmt;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::schema::RunnerConfig;

/// Captured result of one subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl StepOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Text to report when the step failed: stderr, or both streams when
    /// stderr is empty.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        match self.code {
            Some(code) if stdout.is_empty() => format!("exited with status {}", code),
            None if stdout.is_empty() => "terminated by signal".to_string(),
            _ => stdout.to_string(),
        }
    }
}

/// The four operations the deploy pipeline needs from the host.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Fetch all remotes, pruning deleted branches.
    async fn fetch(&self, dir: &Path) -> std::io::Result<StepOutput>;

    /// Hard-reset the working tree to `origin/<branch>`.
    async fn reset_hard(&self, dir: &Path, branch: &str) -> std::io::Result<StepOutput>;

    /// Lockfile-exact install, falling back to a regular install.
    async fn install_dependencies(&self, dir: &Path) -> std::io::Result<StepOutput>;

    /// Restart a supervised process by name.
    async fn restart_process(&self, name: &str) -> std::io::Result<StepOutput>;
}

/// `ProcessRunner` backed by real subprocesses.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    config: RunnerConfig,
}

impl ShellRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    async fn run(&self, program: &str, args: &[&str], dir: Option<&Path>) -> std::io::Result<StepOutput> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = dir {
            command.current_dir(dir);
        }

        tracing::debug!(command = %CommandLine(program, args), dir = ?dir, "Running command");

        let output = command.output().await?;
        Ok(StepOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[async_trait]
impl ProcessRunner for ShellRunner {
    async fn fetch(&self, dir: &Path) -> std::io::Result<StepOutput> {
        self.run(&self.config.git, &["fetch", "--all", "--prune"], Some(dir))
            .await
    }

    async fn reset_hard(&self, dir: &Path, branch: &str) -> std::io::Result<StepOutput> {
        let upstream = format!("origin/{}", branch);
        self.run(&self.config.git, &["reset", "--hard", &upstream], Some(dir))
            .await
    }

    async fn install_dependencies(&self, dir: &Path) -> std::io::Result<StepOutput> {
        let locked = self.run(&self.config.npm, &["ci"], Some(dir)).await?;
        if locked.success() {
            return Ok(locked);
        }

        tracing::warn!(
            dir = %dir.display(),
            error = %locked.diagnostic(),
            "Lockfile install failed, falling back to npm install"
        );
        self.run(&self.config.npm, &["install"], Some(dir)).await
    }

    async fn restart_process(&self, name: &str) -> std::io::Result<StepOutput> {
        let (program, prefix) = self.config.restart_command.split_first().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "restart command is empty")
        })?;

        let mut args: Vec<&str> = prefix.iter().map(String::as_str).collect();
        args.push(name);
        self.run(program, &args, None).await
    }
}

/// Display adapter for log fields.
struct CommandLine<'a>(&'a str, &'a [&'a str]);

impl fmt::Display for CommandLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        for arg in self.1 {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_prefers_stderr() {
        let output = StepOutput {
            code: Some(1),
            stdout: "out\n".into(),
            stderr: "fatal: bad revision\n".into(),
        };
        assert!(!output.success());
        assert_eq!(output.diagnostic(), "fatal: bad revision");

        let quiet = StepOutput {
            code: Some(2),
            ..Default::default()
        };
        assert_eq!(quiet.diagnostic(), "exited with status 2");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_restart_appends_process_name() {
        let runner = ShellRunner::new(RunnerConfig {
            restart_command: vec!["echo".into(), "restart".into()],
            ..RunnerConfig::default()
        });
        let output = runner.restart_process("app-live").await.unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "restart app-live");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_is_captured() {
        let runner = ShellRunner::new(RunnerConfig {
            restart_command: vec!["sh".into(), "-c".into(), "echo oops >&2; exit 3".into()],
            ..RunnerConfig::default()
        });
        let output = runner.restart_process("ignored").await.unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.diagnostic(), "oops");
    }

    #[tokio::test]
    async fn test_missing_directory_is_io_error() {
        let runner = ShellRunner::new(RunnerConfig::default());
        let result = runner
            .fetch(Path::new("/nonexistent/deploy-hook/checkout"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_restart_command() {
        let runner = ShellRunner::new(RunnerConfig {
            restart_command: Vec::new(),
            ..RunnerConfig::default()
        });
        let err = runner.restart_process("app").await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
