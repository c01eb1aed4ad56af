//! Shared-secret authentication for simple hooks.

use axum::http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::error::HookError;

/// Header carrying the shared secret.
pub const SECRET_HEADER: &str = "x-webhook-secret";

/// Constant-time byte comparison.
///
/// Slices of different length compare unequal; only the length leaks.
pub fn secrets_equal(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Check the `X-Webhook-Secret` header against the route's secret.
pub fn verify_shared_secret(headers: &HeaderMap, expected: &SecretString) -> Result<(), HookError> {
    let provided = headers
        .get(SECRET_HEADER)
        .map(|v| v.as_bytes())
        .ok_or(HookError::Unauthorized)?;

    if secrets_equal(provided, expected.expose_secret().as_bytes()) {
        Ok(())
    } else {
        Err(HookError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn test_secrets_equal() {
        assert!(secrets_equal(b"S1", b"S1"));
        assert!(!secrets_equal(b"S1", b"S2"));
        assert!(!secrets_equal(b"S1", b"S1 "));
        assert!(!secrets_equal(b"", b"S1"));
    }

    #[test]
    fn test_verify_header() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            verify_shared_secret(&headers, &secret("S1")),
            Err(HookError::Unauthorized)
        ));

        headers.insert(SECRET_HEADER, HeaderValue::from_static("wrong"));
        assert!(verify_shared_secret(&headers, &secret("S1")).is_err());

        headers.insert("X-Webhook-Secret", HeaderValue::from_static("S1"));
        assert!(verify_shared_secret(&headers, &secret("S1")).is_ok());
    }
}
