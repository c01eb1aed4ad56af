//! Request dispatch.
//!
//! # Data Flow
//! ```text
//! request
//!     → health check short-circuit
//!     → ConfigStore::load (fresh snapshot)
//!     → routing::match_request (candidates on the exact path)
//!     → method check
//!     → simple scheme | GitHub scheme
//!     → DeployExecutor::deploy
//!     → HookResponse | HookError
//! ```

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};

use crate::auth::{self, GitHubResolution, EVENT_HEADER, SIGNATURE_HEADER};
use crate::error::HookError;
use crate::http::request::request_id;
use crate::http::response::{Deployed, HookResponse};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::matcher::request_host;
use crate::routing::{match_request, Candidates};

/// Path of the unauthenticated liveness endpoint.
pub const HEALTH_PATH: &str = "/_deploy/health";

/// Catch-all handler: every path is resolved against the routing file.
pub async fn dispatch_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();
    let path = uri.path();

    let mut scheme = "none";

    let response = if path == HEALTH_PATH && (method == Method::GET || method == Method::HEAD) {
        scheme = "health";
        HookResponse::Pong.into_response()
    } else {
        match dispatch(&state, &method, path, &headers, &body, &mut scheme).await {
            Ok(outcome) => outcome.into_response(),
            Err(e) => {
                let status = e.status();
                if status.is_server_error() {
                    tracing::error!(request_id = %request_id(&headers), path = %path, error = %e, "Request failed");
                } else {
                    tracing::warn!(request_id = %request_id(&headers), path = %path, status = %status, "Request rejected");
                }
                e.into_response()
            }
        }
    };

    metrics::record_request(scheme, response.status().as_u16(), started);
    response
}

async fn dispatch(
    state: &AppState,
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    body: &[u8],
    scheme: &mut &'static str,
) -> Result<HookResponse, HookError> {
    let config = state.store.load().await?;
    let candidates = match_request(&config, path);

    if candidates.is_empty() {
        return Err(HookError::NoRouteMatch);
    }
    if method != Method::POST {
        return Err(HookError::MethodNotAllowed);
    }

    // A path carrying both kinds of route is GitHub only when GitHub says so.
    let github_event = headers.get(EVENT_HEADER).and_then(|v| v.to_str().ok());
    if !candidates.github.is_empty() && (github_event.is_some() || candidates.simple.is_empty()) {
        *scheme = "github";
        handle_github(state, &candidates, github_event, headers, body).await
    } else {
        *scheme = "simple";
        handle_simple(state, &candidates, headers).await
    }
}

async fn handle_simple(
    state: &AppState,
    candidates: &Candidates<'_>,
    headers: &HeaderMap,
) -> Result<HookResponse, HookError> {
    let host = request_host(headers);
    let entry = candidates
        .select_simple(&host)
        .ok_or(HookError::NoRouteMatch)?;

    auth::verify_shared_secret(headers, &entry.secret)?;

    tracing::info!(
        request_id = %request_id(headers),
        route_id = %entry.id,
        host = %host,
        "Simple hook authenticated"
    );

    let report = state.executor.deploy(&entry.target()).await?;
    Ok(HookResponse::Deployed(Deployed {
        ok: true,
        result: report.stdout(),
        id: entry.id.clone(),
        host: Some(host),
        repo: None,
        git_ref: None,
    }))
}

async fn handle_github(
    state: &AppState,
    candidates: &Candidates<'_>,
    event: Option<&str>,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<HookResponse, HookError> {
    if event == Some("ping") {
        tracing::info!(request_id = %request_id(headers), "GitHub ping");
        return Ok(HookResponse::Pong);
    }

    let signature = headers.get(SIGNATURE_HEADER).map(|v| v.as_bytes());
    match auth::resolve_github(&candidates.github, body, signature)? {
        GitHubResolution::Matched {
            entry,
            target,
            repository,
            git_ref,
        } => {
            tracing::info!(
                request_id = %request_id(headers),
                route_id = %entry.id,
                repo = %repository,
                git_ref = %git_ref,
                "GitHub push authenticated"
            );

            let report = state.executor.deploy(target).await?;
            Ok(HookResponse::Deployed(Deployed {
                ok: true,
                result: report.stdout(),
                id: entry.id.clone(),
                host: None,
                repo: Some(repository),
                git_ref: Some(git_ref),
            }))
        }
        GitHubResolution::Ignored { reason } => {
            tracing::info!(request_id = %request_id(headers), event = ?event, reason = %reason, "GitHub event ignored");
            Ok(HookResponse::Ignored(reason))
        }
    }
}
