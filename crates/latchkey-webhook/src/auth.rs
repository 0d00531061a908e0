//! Inbound delivery authentication.
//!
//! Verification: constant-time signature comparison plus a replay window
//! on the delivery timestamp. Malformed headers degrade to values that
//! fail verification; nothing in this module returns an error or panics
//! on attacker-controlled input.

use tracing::debug;

use latchkey_core::{message_signature, signatures_match, unix_now, ApiKey};

/// Maximum clock skew accepted between the bridge and this host, in
/// seconds, applied in both directions.
pub const ALLOWED_DRIFT_SECONDS: u64 = 60;

// ---------------------------------------------------------------------------
// InboundMessage — raw delivery as received, before any trust
// ---------------------------------------------------------------------------

/// An inbound webhook delivery exactly as it arrived: raw body bytes and
/// the two authentication headers. Validity is derived by
/// [`MessageVerifier::verify`], never stored.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub body: Vec<u8>,
    pub timestamp: u64,
    pub signature: String,
}

impl InboundMessage {
    /// Assemble a message from header values as the HTTP layer saw them.
    ///
    /// An absent or non-numeric `timestamp` header becomes `0`, which can
    /// never fall inside the replay window; an absent `hash` header
    /// becomes the empty string, which can never match a digest. Both
    /// therefore reject downstream without special-casing here.
    pub fn from_parts(
        body: Vec<u8>,
        timestamp_header: Option<&str>,
        hash_header: Option<&str>,
    ) -> Self {
        let timestamp = timestamp_header
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0);
        let signature = hash_header.unwrap_or_default().to_string();
        Self {
            body,
            timestamp,
            signature,
        }
    }
}

// ---------------------------------------------------------------------------
// MessageVerifier — recompute, compare, enforce the window
// ---------------------------------------------------------------------------

/// Verifies inbound deliveries against the configured webhook API key.
///
/// Stateless per call; a single verifier may be shared across concurrent
/// deliveries.
#[derive(Debug, Clone)]
pub struct MessageVerifier {
    key: ApiKey,
    allow_any_timestamp: bool,
}

impl MessageVerifier {
    pub fn new(key: ApiKey) -> Self {
        Self {
            key,
            allow_any_timestamp: false,
        }
    }

    /// Disable the replay window. Only the registration flow needs this,
    /// for test deliveries whose timestamps predate the check.
    pub fn allow_any_timestamp(mut self, allow: bool) -> Self {
        self.allow_any_timestamp = allow;
        self
    }

    /// Decide whether `message` is authentic and timely. `false` means
    /// the message must be dropped unparsed.
    pub fn verify(&self, message: &InboundMessage) -> bool {
        self.verify_at(message, unix_now())
    }

    /// Deterministic core of [`verify`]: the replay window is evaluated
    /// against an explicit `now`, which callers must read at validation
    /// time rather than at header-parse time.
    pub fn verify_at(&self, message: &InboundMessage, now: u64) -> bool {
        let expected =
            message_signature(&message.body, message.timestamp, self.key.as_bytes());

        if !signatures_match(&message.signature, &expected) {
            debug!(
                body_len = message.body.len(),
                "dropping webhook delivery: signature mismatch"
            );
            return false;
        }

        if !self.allow_any_timestamp {
            let lower = now.saturating_sub(ALLOWED_DRIFT_SECONDS);
            let upper = now + ALLOWED_DRIFT_SECONDS;
            if message.timestamp < lower || message.timestamp > upper {
                debug!(
                    timestamp = message.timestamp,
                    now, "dropping webhook delivery: outside replay window"
                );
                return false;
            }
        }

        true
    }
}
