//! Route matching primitives.
//!
//! # Responsibilities
//! - Match request path (exact, case-sensitive)
//! - Extract the request hostname from the Host header
//! - Match route host (exact, case-sensitive, port stripped)
//!
//! # Design Decisions
//! - No trailing-slash normalization, no wildcards: callers register exact paths
//! - Host comparison is byte-for-byte on the stripped hostname
//! - Missing Host header behaves as an empty hostname

use axum::http::{header, HeaderMap};

/// Returns true if the route path equals the request path exactly.
pub fn path_matches(route_path: &str, request_path: &str) -> bool {
    route_path == request_path
}

/// Returns true if the route's host equals the request hostname.
///
/// Routes without a host never match by host; they are only reachable as the
/// first-entry fallback.
pub fn host_matches(route_host: Option<&str>, request_host: &str) -> bool {
    matches!(route_host, Some(h) if !request_host.is_empty() && h == request_host)
}

/// The request hostname without any port.
pub fn request_host(headers: &HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(strip_port)
        .unwrap_or_default()
        .to_string()
}

/// Strip a trailing `:port` from a Host header value.
///
/// Bracketed IPv6 literals keep their brackets: `[::1]:8080` → `[::1]`.
pub fn strip_port(host: &str) -> &str {
    let host = host.trim();
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_path_is_exact() {
        assert!(path_matches("/_deploy/live", "/_deploy/live"));
        assert!(!path_matches("/_deploy/live", "/_deploy/live/"));
        assert!(!path_matches("/_deploy/live", "/_deploy/LIVE"));
        assert!(!path_matches("/_deploy", "/_deploy/live"));
    }

    #[test]
    fn test_host_matcher() {
        assert!(host_matches(Some("example.com"), "example.com"));
        assert!(!host_matches(Some("example.com"), "EXAMPLE.COM")); // Case sensitive
        assert!(!host_matches(Some("example.com"), "other.com"));
        assert!(!host_matches(None, "example.com"));
        assert!(!host_matches(Some(""), ""));
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("example.com:8080"), "example.com");
        assert_eq!(strip_port("example.com"), "example.com");
        assert_eq!(strip_port("[::1]:9000"), "[::1]");
        assert_eq!(strip_port("[::1]"), "[::1]");
        assert_eq!(strip_port("127.0.0.1:9000"), "127.0.0.1");
    }

    #[test]
    fn test_request_host_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_host(&headers), "");

        headers.insert(header::HOST, HeaderValue::from_static("b.example.com:443"));
        assert_eq!(request_host(&headers), "b.example.com");
    }
}
