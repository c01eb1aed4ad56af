//! Response rendering.
//!
//! # Responsibilities
//! - Render every outcome as one JSON body
//! - Map `HookError` variants to status codes
//!
//! # Design Decisions
//! - Every body carries `ok`
//! - Secrets and config parse errors are never written to a body
//! - Ignored GitHub events are 200: GitHub treats 2xx as delivered

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::deploy::DeployError;
use crate::error::HookError;

/// Body of a successful deploy.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Deployed {
    pub ok: bool,
    /// Pipeline stdout.
    pub result: String,
    /// Route ID.
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
}

/// A successful (2xx) outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookResponse {
    /// Health check or GitHub ping.
    Pong,
    Deployed(Deployed),
    /// Authenticated GitHub event that maps to no target.
    Ignored(String),
}

#[derive(Debug, Serialize)]
struct Pong {
    ok: bool,
    pong: bool,
}

#[derive(Debug, Serialize)]
struct Ignored<'a> {
    ok: bool,
    ignored: &'a str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    ok: bool,
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for HookResponse {
    fn into_response(self) -> Response {
        match self {
            HookResponse::Pong => Json(Pong { ok: true, pong: true }).into_response(),
            HookResponse::Deployed(body) => Json(body).into_response(),
            HookResponse::Ignored(reason) => Json(Ignored {
                ok: true,
                ignored: &reason,
            })
            .into_response(),
        }
    }
}

impl HookError {
    pub fn status(&self) -> StatusCode {
        match self {
            HookError::ConfigUnreadable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HookError::Unauthorized => StatusCode::UNAUTHORIZED,
            HookError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            HookError::NoRouteMatch => StatusCode::NOT_FOUND,
            HookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            HookError::Deploy(DeployError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            HookError::Deploy(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (error, details) = match self {
            HookError::ConfigUnreadable(_) => ("config unreadable", None),
            HookError::Unauthorized => ("unauthorized", None),
            HookError::MethodNotAllowed => ("method not allowed", None),
            HookError::NoRouteMatch => ("not found", None),
            HookError::InvalidPayload(_) => ("invalid payload", None),
            HookError::Deploy(e @ DeployError::Timeout(_)) => ("deploy timed out", Some(e.details())),
            HookError::Deploy(e) => ("deploy failed", Some(e.details())),
        };
        ErrorBody {
            ok: false,
            error,
            details,
        }
    }
}

impl IntoResponse for HookError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
