//! Request authentication.
//!
//! # Data Flow
//! ```text
//! Simple hook:
//!     X-Webhook-Secret → secret.rs (constant-time compare) → target
//!
//! GitHub hook:
//!     raw body + X-Hub-Signature-256
//!     → signature.rs (HMAC-SHA256 per candidate)
//!     → github.rs (payload repository/ref → target, or ignore)
//! ```
//!
//! # Design Decisions
//! - Secrets live in `SecretString` and are exposed only to compare
//! - All comparisons are constant-time
//! - Signatures are computed over the bytes as received

pub mod github;
pub mod secret;
pub mod signature;

pub use github::{resolve as resolve_github, GitHubResolution, PushEvent, EVENT_HEADER};
pub use secret::{verify_shared_secret, SECRET_HEADER};
pub use signature::{sign, verify_signature, SIGNATURE_HEADER};
