//! Request-level error taxonomy.
//!
//! Every variant is rendered as a JSON body by the HTTP layer
//! (see `http::response`). None of them escape a request handler.

use crate::config::ConfigError;
use crate::deploy::DeployError;

#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// The routing file is missing or invalid.
    #[error("config unreadable: {0}")]
    ConfigUnreadable(#[from] ConfigError),

    /// Bad or missing shared secret / signature.
    #[error("unauthorized")]
    Unauthorized,

    #[error("method not allowed")]
    MethodNotAllowed,

    /// No route of either kind is registered on the path.
    #[error("not found")]
    NoRouteMatch,

    /// A correctly signed body that is not a JSON document.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Deploy(#[from] DeployError),
}
