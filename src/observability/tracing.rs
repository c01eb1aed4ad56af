//! Request spans.
//!
//! # Responsibilities
//! - Build the span `TraceLayer` opens for each request
//! - Carry the request ID so every log line of a request can be correlated
//!
//! # Design Decisions
//! - The request ID is assigned before this span is created (outer layer)
//! - Header values are never recorded; they may hold secrets

use axum::http::Request;
use tracing::Span;

use crate::http::request::request_id;

/// Span for one inbound request.
pub fn make_request_span<B>(request: &Request<B>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request.headers()),
    )
}
