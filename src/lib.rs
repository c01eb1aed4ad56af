//! Deploy webhook dispatcher library.

pub mod auth;
pub mod config;
pub mod deploy;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::HookConfig;
pub use config::ConfigStore;
pub use deploy::{DeployExecutor, ProcessRunner};
pub use error::HookError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
