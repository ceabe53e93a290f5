//! SHA-256 helpers for token derivation and request signing.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of a UTF-8 string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Derive a fresh session token: `SHA256("{appkey}-{timestamp}")`.
pub fn derive_token(appkey: &str, timestamp: i64) -> String {
    sha256_hex(&format!("{}-{}", appkey, timestamp))
}

/// Compute a request signature: `SHA256("{timestamp},{token},{appkey}")`.
pub fn sign(timestamp: i64, token: &str, appkey: &str) -> String {
    sha256_hex(&format!("{},{},{}", timestamp, token, appkey))
}

/// Check a client-supplied signature. Comparison is exact (case-sensitive).
pub fn verify_signature(timestamp: i64, token: &str, appkey: &str, signature: &str) -> bool {
    let expected = sign(timestamp, token, appkey);
    constant_time_eq(expected.as_bytes(), signature.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_value() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_derive_token_matches_manual_hash() {
        let token = derive_token("K1", 1700000000000);
        assert_eq!(token, sha256_hex("K1-1700000000000"));
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_sign_input_order() {
        assert_eq!(
            sign(1700000000000, "tok", "K1"),
            sha256_hex("1700000000000,tok,K1")
        );
        assert_ne!(sign(1, "tok", "K1"), sign(1, "K1", "tok"));
    }

    #[test]
    fn test_verify_signature() {
        let sig = sign(42, "tok", "K1");
        assert!(verify_signature(42, "tok", "K1", &sig));
        assert!(!verify_signature(43, "tok", "K1", &sig));
        assert!(!verify_signature(42, "tok", "K1", &sig.to_uppercase()));
        assert!(!verify_signature(42, "tok", "K1", ""));
    }
}
