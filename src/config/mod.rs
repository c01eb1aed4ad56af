//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! routing file (JSON or TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HookConfig (validated snapshot)
//!
//! On every request:
//!     store.rs checks the reload policy
//!     → loader.rs loads the newest file
//!     → the handler matches against that snapshot
//! ```
//!
//! # Design Decisions
//! - The routing file is owned by external tooling; nothing here writes it
//! - Route tables are fresh per request, service sections are read at startup
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod store;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    DeployTarget, GitHubRouteEntry, HookConfig, LimitsConfig, ObservabilityConfig, ReloadMode,
    RouteEntry, RunnerConfig,
};
pub use store::ConfigStore;
