//! The signature engine.
//!
//! Two related schemes share this module. Webhook traffic (both the
//! headers stamped on management requests and inbound event deliveries)
//! uses a keyed SHA-256 digest over `body || timestamp || key`, rendered
//! as lowercase hex. Lock commands use HMAC-SHA256 over the fixed header
//! fields, keyed by the decoded lock secret. Both are pure functions;
//! callers hold the keys.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{CoreError, CoreResult};

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex signature for a webhook-scheme message:
/// `SHA-256(body || timestamp_be8 || key)`.
///
/// The timestamp is serialized as 8 bytes big-endian, the same framing the
/// bridge uses when it signs outbound deliveries.
pub fn message_signature(body: &[u8], timestamp: u64, key: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    hasher.update(timestamp.to_be_bytes());
    hasher.update(key);
    hex::encode(hasher.finalize())
}

/// Compute the HMAC-SHA256 for a lock command over
/// `protocol || command_type || timestamp_be8 || local_key_id || device_id || action`.
pub fn command_mac(
    protocol: u8,
    command_type: u8,
    timestamp: u64,
    local_key_id: u8,
    device_id: u8,
    action: u8,
    secret: &[u8],
) -> CoreResult<[u8; 32]> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| CoreError::Crypto)?;
    mac.update(&[protocol, command_type]);
    mac.update(&timestamp.to_be_bytes());
    mac.update(&[local_key_id, device_id, action]);
    Ok(mac.finalize().into_bytes().into())
}

/// Constant-time comparison of two hex signature strings.
///
/// Length is not secret; content comparison never early-exits.
pub fn signatures_match(claimed: &str, expected: &str) -> bool {
    if claimed.len() != expected.len() {
        return false;
    }
    claimed.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Fixed reference vector: empty body, timestamp 1700000000, key "abc"
    // (base64 "YWJj").
    const REFERENCE_SIGNATURE: &str =
        "55e24bba0db8d5ec701989176723d0a5c806703799ce99937eeb1ce3c0260ae5";

    #[test]
    fn test_message_signature_reference_vector() {
        assert_eq!(
            message_signature(b"", 1_700_000_000, b"abc"),
            REFERENCE_SIGNATURE
        );
    }

    #[test]
    fn test_message_signature_body_sensitivity() {
        let a = message_signature(b"payload", 1_700_000_000, b"abc");
        let b = message_signature(b"payloae", 1_700_000_000, b"abc");
        assert_ne!(a, b);
    }

    #[test]
    fn test_message_signature_timestamp_sensitivity() {
        let a = message_signature(b"payload", 1_700_000_000, b"abc");
        let b = message_signature(b"payload", 1_700_000_001, b"abc");
        assert_ne!(a, b);
    }

    #[test]
    fn test_command_mac_reference_vector() {
        // Open, key slot 1, secret "abc", timestamp 1700000000.
        let mac = command_mac(2, 7, 1_700_000_000, 1, 1, 1, b"abc").unwrap();
        assert_eq!(
            hex::encode(mac),
            "ef4aa66c99a3427da66aaa632554076798ddebec72a10559c56aedac5b0fcccb"
        );
    }

    #[test]
    fn test_command_mac_differs_per_action() {
        let open = command_mac(2, 7, 1_700_000_000, 1, 1, 1, b"abc").unwrap();
        let lock = command_mac(2, 7, 1_700_000_000, 1, 1, 3, b"abc").unwrap();
        assert_ne!(open, lock);
    }

    #[test]
    fn test_signatures_match() {
        assert!(signatures_match(REFERENCE_SIGNATURE, REFERENCE_SIGNATURE));
    }

    #[test]
    fn test_signatures_match_rejects_flipped_nibble() {
        let mut tampered = REFERENCE_SIGNATURE.to_string();
        tampered.replace_range(0..1, "6");
        assert!(!signatures_match(&tampered, REFERENCE_SIGNATURE));
    }

    #[test]
    fn test_signatures_match_rejects_length_mismatch() {
        assert!(!signatures_match("55e2", REFERENCE_SIGNATURE));
        assert!(!signatures_match("", REFERENCE_SIGNATURE));
    }

    #[test]
    fn test_signatures_are_case_sensitive() {
        assert!(!signatures_match(
            &REFERENCE_SIGNATURE.to_uppercase(),
            REFERENCE_SIGNATURE
        ));
    }
}
