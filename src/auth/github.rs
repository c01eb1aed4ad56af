//! GitHub push-event authentication and target resolution.
//!
//! # Responsibilities
//! - Verify `X-Hub-Signature-256` against each candidate's secret in order
//! - Parse the push payload once, only when some signature verifies
//! - Pick the first candidate whose repository and ref both match
//!
//! # Design Decisions
//! - A failed signature moves on to the next candidate; several repositories
//!   may share one path
//! - A repository mismatch also moves on instead of failing the request
//! - Nothing verified at all is `401`; verified but unmapped is a 200 ignore

use serde::Deserialize;
use secrecy::ExposeSecret;

use crate::auth::signature::verify_signature;
use crate::config::schema::{DeployTarget, GitHubRouteEntry};
use crate::error::HookError;

/// Header naming the GitHub event type.
pub const EVENT_HEADER: &str = "x-github-event";

/// The parts of a push payload the dispatcher reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushEvent {
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,

    #[serde(default)]
    pub repository: Option<Repository>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub full_name: String,
}

impl PushEvent {
    pub fn full_name(&self) -> &str {
        self.repository
            .as_ref()
            .map(|r| r.full_name.as_str())
            .unwrap_or_default()
    }
}

/// Outcome of resolving a signed GitHub request.
#[derive(Debug)]
pub enum GitHubResolution<'a> {
    /// A candidate verified and maps the pushed ref.
    Matched {
        entry: &'a GitHubRouteEntry,
        target: &'a DeployTarget,
        repository: String,
        git_ref: String,
    },
    /// At least one signature verified but nothing maps the event.
    Ignored { reason: String },
}

/// Resolve `body` against the GitHub candidates registered on the path.
pub fn resolve<'a>(
    candidates: &[&'a GitHubRouteEntry],
    body: &[u8],
    signature: Option<&[u8]>,
) -> Result<GitHubResolution<'a>, HookError> {
    let verified: Vec<&'a GitHubRouteEntry> = candidates
        .iter()
        .copied()
        .filter(|entry| {
            let ok = verify_signature(entry.secret.expose_secret().as_bytes(), body, signature);
            if !ok {
                tracing::debug!(route_id = %entry.id, "Signature did not verify for candidate");
            }
            ok
        })
        .collect();

    if verified.is_empty() {
        return Err(HookError::Unauthorized);
    }

    let event: PushEvent =
        serde_json::from_slice(body).map_err(|e| HookError::InvalidPayload(e.to_string()))?;
    let full_name = event.full_name();
    let mut reason: Option<String> = None;

    for entry in verified {
        if !entry.repository_full_name.is_empty() && entry.repository_full_name != full_name {
            tracing::debug!(
                route_id = %entry.id,
                expected = %entry.repository_full_name,
                received = %full_name,
                "Repository mismatch, trying next candidate"
            );
            if reason.is_none() {
                reason = Some(format!("no route for repository {}", full_name));
            }
            continue;
        }

        let Some(git_ref) = event.git_ref.as_deref() else {
            reason = Some("event has no ref".to_string());
            continue;
        };

        match entry.ref_to_target.get(git_ref) {
            Some(target) => {
                return Ok(GitHubResolution::Matched {
                    entry,
                    target,
                    repository: full_name.to_string(),
                    git_ref: git_ref.to_string(),
                });
            }
            None => reason = Some(format!("no mapping for {}", git_ref)),
        }
    }

    Ok(GitHubResolution::Ignored {
        reason: reason.unwrap_or_else(|| "no matching route".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::signature::sign;
    use crate::config::HookConfig;

    fn config() -> HookConfig {
        serde_json::from_str(
            r#"{"github": [
                {"id": "one", "path": "/_github", "secret": "secret-one", "repo": "acme/one",
                 "map": {"refs/heads/main": {"dir": "/srv/one", "branch": "main", "process": "one-live"}}},
                {"id": "any", "path": "/_github", "secret": "secret-any",
                 "map": {"refs/heads/dev": {"dir": "/srv/any", "branch": "dev", "process": "any-dev"}}}
            ]}"#,
        )
        .unwrap()
    }

    fn push(repo: &str, git_ref: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "ref": git_ref,
            "repository": {"full_name": repo},
            "after": "0000000000000000000000000000000000000000"
        }))
        .unwrap()
    }

    #[test]
    fn test_first_full_match_wins() {
        let config = config();
        let candidates: Vec<_> = config.github.iter().collect();
        let body = push("acme/one", "refs/heads/main");
        let sig = sign(b"secret-one", &body);

        match resolve(&candidates, &body, Some(sig.as_bytes())).unwrap() {
            GitHubResolution::Matched { entry, target, repository, git_ref } => {
                assert_eq!(entry.id, "one");
                assert_eq!(target.process_name, "one-live");
                assert_eq!(repository, "acme/one");
                assert_eq!(git_ref, "refs/heads/main");
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_signature_binds_candidate() {
        // Signed for "one", but only the wildcard entry maps refs/heads/dev.
        let config = config();
        let candidates: Vec<_> = config.github.iter().collect();
        let body = push("acme/one", "refs/heads/dev");
        let sig = sign(b"secret-one", &body);

        match resolve(&candidates, &body, Some(sig.as_bytes())).unwrap() {
            GitHubResolution::Ignored { reason } => {
                assert_eq!(reason, "no mapping for refs/heads/dev");
            }
            other => panic!("wildcard entry must not accept a foreign signature: {:?}", other),
        }
    }

    #[test]
    fn test_wildcard_repository() {
        let config = config();
        let candidates: Vec<_> = config.github.iter().collect();
        let body = push("someone/else", "refs/heads/dev");
        let sig = sign(b"secret-any", &body);

        let resolution = resolve(&candidates, &body, Some(sig.as_bytes())).unwrap();
        assert!(matches!(resolution, GitHubResolution::Matched { entry, .. } if entry.id == "any"));
    }

    #[test]
    fn test_repository_mismatch_is_ignored() {
        let config = config();
        let candidates: Vec<_> = config.github.iter().collect();
        let body = push("acme/two", "refs/heads/main");
        let sig = sign(b"secret-one", &body);

        match resolve(&candidates, &body, Some(sig.as_bytes())).unwrap() {
            GitHubResolution::Ignored { reason } => {
                assert_eq!(reason, "no route for repository acme/two")
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_no_verified_candidate_is_unauthorized() {
        let config = config();
        let candidates: Vec<_> = config.github.iter().collect();
        let body = push("acme/one", "refs/heads/main");
        let sig = sign(b"not-configured", &body);

        assert!(matches!(
            resolve(&candidates, &body, Some(sig.as_bytes())),
            Err(HookError::Unauthorized)
        ));
        assert!(matches!(resolve(&candidates, &body, None), Err(HookError::Unauthorized)));
    }

    #[test]
    fn test_signed_garbage_is_invalid_payload() {
        let config = config();
        let candidates: Vec<_> = config.github.iter().collect();
        let body = b"not json at all";
        let sig = sign(b"secret-one", body);

        assert!(matches!(
            resolve(&candidates, body, Some(sig.as_bytes())),
            Err(HookError::InvalidPayload(_))
        ));
    }
}
