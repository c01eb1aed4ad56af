//! HMAC-SHA256 request signatures (`X-Hub-Signature-256`).

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::auth::secret::secrets_equal;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

/// `sha256=<hex digest>` of `body` keyed with `secret`.
pub fn sign(secret: &[u8], body: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 accepts any key length"),
    };
    mac.update(body);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

/// Check a signature header against the raw body bytes.
pub fn verify_signature(secret: &[u8], body: &[u8], provided: Option<&[u8]>) -> bool {
    match provided {
        Some(provided) => secrets_equal(sign(secret, body).as_bytes(), provided),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc4231_vector() {
        assert_eq!(
            sign(b"Jefe", b"what do ya want for nothing?"),
            "sha256=5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_github_documented_vector() {
        assert_eq!(
            sign(b"It's a Secret to Everybody", b"Hello, World!"),
            "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17"
        );
    }

    #[test]
    fn test_verify_is_bit_exact() {
        let body = br#"{"ref":"refs/heads/main"}"#;
        let header = sign(b"key", body);
        assert!(verify_signature(b"key", body, Some(header.as_bytes())));

        // Re-encoded JSON with the same meaning must not verify.
        let reencoded = br#"{ "ref": "refs/heads/main" }"#;
        assert!(!verify_signature(b"key", reencoded, Some(header.as_bytes())));

        assert!(!verify_signature(b"other", body, Some(header.as_bytes())));
        assert!(!verify_signature(b"key", body, None));
        assert!(!verify_signature(b"key", body, Some(header.to_uppercase().as_bytes())));
    }
}
