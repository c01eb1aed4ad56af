//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate route fields (ids, paths, secrets, working directories)
//! - Detect routes sharing the same `(path, host)` pair
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HookConfig → Result<(), Vec<ValidationError>>
//! - Duplicate routes are warnings; the matcher tolerates them
//! - `retain_valid` drops only the offending entries, for per-request loads

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use secrecy::ExposeSecret;

use crate::config::schema::{DeployTarget, GitHubRouteEntry, HookConfig, RouteEntry};

/// A single semantic problem in the routing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Where the problem is, e.g. `hooks[2].secret`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &HookConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    for (i, hook) in config.hooks.iter().enumerate() {
        errors.extend(hook_errors(i, hook));
    }
    for (i, entry) in config.github.iter().enumerate() {
        errors.extend(github_errors(i, entry));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Drop every route entry that fails validation, returning the problems.
///
/// The remaining entries keep their order. Indices in the returned errors
/// refer to positions in the file.
pub fn retain_valid(config: &mut HookConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let hooks = std::mem::take(&mut config.hooks);
    for (i, hook) in hooks.into_iter().enumerate() {
        let problems = hook_errors(i, &hook);
        if problems.is_empty() {
            config.hooks.push(hook);
        } else {
            errors.extend(problems);
        }
    }

    let github = std::mem::take(&mut config.github);
    for (i, entry) in github.into_iter().enumerate() {
        let problems = github_errors(i, &entry);
        if problems.is_empty() {
            config.github.push(entry);
        } else {
            errors.extend(problems);
        }
    }

    errors
}

fn hook_errors(i: usize, hook: &RouteEntry) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let at = format!("hooks[{}]", i);
    check_id(&at, &hook.id, &mut errors);
    check_path(&at, &hook.path, &mut errors);
    check_secret(&at, hook.secret.expose_secret(), &mut errors);
    if hook.host.as_deref().is_some_and(str::is_empty) {
        errors.push(ValidationError::new(format!("{at}.host"), "must not be empty when set"));
    }
    check_target(&at, &hook.target(), &mut errors);
    errors
}

fn github_errors(i: usize, entry: &GitHubRouteEntry) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let at = format!("github[{}]", i);
    check_id(&at, &entry.id, &mut errors);
    check_path(&at, &entry.path, &mut errors);
    check_secret(&at, entry.secret.expose_secret(), &mut errors);
    for (git_ref, target) in &entry.ref_to_target {
        if !git_ref.starts_with("refs/") {
            errors.push(ValidationError::new(
                format!("{at}.refToTarget"),
                format!("ref '{git_ref}' must be fully qualified (refs/...)"),
            ));
        }
        check_target(&format!("{at}.refToTarget[{git_ref}]"), target, &mut errors);
    }
    errors
}

/// Simple routes sharing a `(path, host)` pair, as `path host` labels.
///
/// Only the first of each group is ever selected by the matcher.
pub fn duplicate_routes(config: &HookConfig) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for hook in &config.hooks {
        let key = (hook.path.as_str(), hook.host.as_deref().unwrap_or(""));
        if !seen.insert(key) {
            duplicates.push(format!("{} {}", key.0, key.1).trim_end().to_string());
        }
    }
    duplicates
}

fn check_id(at: &str, id: &str, errors: &mut Vec<ValidationError>) {
    if id.trim().is_empty() {
        errors.push(ValidationError::new(format!("{at}.id"), "must not be empty"));
    }
}

fn check_path(at: &str, path: &str, errors: &mut Vec<ValidationError>) {
    if !path.starts_with('/') {
        errors.push(ValidationError::new(format!("{at}.path"), "must start with '/'"));
    }
}

fn check_secret(at: &str, secret: &str, errors: &mut Vec<ValidationError>) {
    if secret.is_empty() {
        errors.push(ValidationError::new(format!("{at}.secret"), "must not be empty"));
    }
}

fn check_target(at: &str, target: &DeployTarget, errors: &mut Vec<ValidationError>) {
    if !Path::new(&target.working_directory).is_absolute() {
        errors.push(ValidationError::new(
            format!("{at}.workingDirectory"),
            "must be an absolute path",
        ));
    }
    if target.branch.trim().is_empty() {
        errors.push(ValidationError::new(format!("{at}.branch"), "must not be empty"));
    }
    if target.process_name.trim().is_empty() {
        errors.push(ValidationError::new(format!("{at}.processName"), "must not be empty"));
    }
}
