//! Deployment subsystem.
//!
//! # Data Flow
//! ```text
//! DeployTarget (dir, branch, process)
//!     → locks.rs (wait for exclusive use of dir)
//!     → executor.rs (fetch → reset → install → restart, under timeout)
//!     → runner.rs (git / npm / supervisor subprocesses)
//!     → DeployReport or DeployError
//! ```

pub mod executor;
pub mod locks;
pub mod runner;

pub use executor::{DeployError, DeployExecutor, DeployReport, DeployStep};
pub use locks::TargetLocks;
pub use runner::{ProcessRunner, ShellRunner, StepOutput};
