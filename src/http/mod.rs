//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → handlers.rs (match, authenticate, deploy)
//!     → response.rs (JSON body and status)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use handlers::HEALTH_PATH;
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::{Deployed, HookResponse};
pub use server::{AppState, HttpServer};
