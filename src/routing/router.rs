//! Route lookup.
//!
//! # Responsibilities
//! - Collect every route whose path equals the request path
//! - Keep simple and GitHub candidates apart
//! - Pick one simple route by host, falling back to file order
//!
//! # Design Decisions
//! - Borrowed from the per-request snapshot, nothing is cached
//! - O(n) scan (route tables are small)
//! - GitHub candidates are not narrowed here: only the signature and payload
//!   can tell them apart

use crate::config::schema::{GitHubRouteEntry, HookConfig, RouteEntry};
use crate::routing::matcher::{host_matches, path_matches};

/// Routes registered on one request path, in file order.
#[derive(Debug, Default)]
pub struct Candidates<'a> {
    pub simple: Vec<&'a RouteEntry>,
    pub github: Vec<&'a GitHubRouteEntry>,
}

impl<'a> Candidates<'a> {
    /// True when neither table has an entry for the path.
    pub fn is_empty(&self) -> bool {
        self.simple.is_empty() && self.github.is_empty()
    }

    /// The simple route for `host`: first host match, else the first entry.
    pub fn select_simple(&self, host: &str) -> Option<&'a RouteEntry> {
        self.simple
            .iter()
            .find(|entry| host_matches(entry.host.as_deref(), host))
            .or_else(|| self.simple.first())
            .copied()
    }
}

/// Collect candidates for `path` from a snapshot.
pub fn match_request<'a>(config: &'a HookConfig, path: &str) -> Candidates<'a> {
    Candidates {
        simple: config
            .hooks
            .iter()
            .filter(|entry| path_matches(&entry.path, path))
            .collect(),
        github: config
            .github
            .iter()
            .filter(|entry| path_matches(&entry.path, path))
            .collect(),
    }
}
