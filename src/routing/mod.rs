//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (path, Host header)
//!     → router.rs (collect candidates from the current snapshot)
//!     → matcher.rs (exact path, stripped host)
//!     → Return: simple + GitHub candidates, possibly empty
//! ```
//!
//! # Design Decisions
//! - Routes are matched against the snapshot loaded for this request
//! - Deterministic: same snapshot and request always select the same route
//! - Empty candidate lists are an explicit 404, never a default route

pub mod matcher;
pub mod router;

pub use router::{match_request, Candidates};
