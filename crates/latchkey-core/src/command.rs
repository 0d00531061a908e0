//! Signed binary lock commands.
//!
//! A command is built, signed, and encoded per invocation; nothing is
//! cached or reused. The bridge rejects stale timestamps, so every build
//! reads the clock fresh.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::crypto::command_mac;
use crate::error::CoreResult;
use crate::types::{unix_now, ActionType, Credentials};

/// Wire constants fixed by the bridge's command protocol.
pub const MESSAGE_ID: u64 = 0;
pub const PROTOCOL_VERSION: u8 = 2;
pub const COMMAND_TYPE: u8 = 7;
pub const DEVICE_ID: u8 = 1;

/// Total encoded length: message id (8) + protocol (1) + type (1) +
/// timestamp (8) + mac (32) + key id (1) + device id (1) + action (1).
pub const COMMAND_LEN: usize = 53;

/// Characters escaped when the base64 command rides in a query string:
/// everything except unreserved characters and `/`. In practice that
/// turns base64's `+` into `%2B` and padding `=` into `%3D`.
const QUERY_VALUE_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// A fully built, HMAC-authenticated lock command.
///
/// The signature covers `protocol || command_type || timestamp ||
/// local_key_id || device_id || action`, so it is bound to this exact
/// timestamp and payload and is never valid for any other.
#[derive(Debug, Clone)]
pub struct SignedCommand {
    bytes: [u8; COMMAND_LEN],
}

impl SignedCommand {
    /// Build and sign a command for `action` at the current time.
    pub fn build(action: ActionType, credentials: &Credentials) -> CoreResult<Self> {
        Self::build_at(action, credentials, unix_now())
    }

    /// Deterministic core of [`build`]: sign at an explicit timestamp.
    pub fn build_at(
        action: ActionType,
        credentials: &Credentials,
        timestamp: u64,
    ) -> CoreResult<Self> {
        let local_key_id = credentials.local_key_id.as_byte();
        let action_code = action.wire_code();
        let mac = command_mac(
            PROTOCOL_VERSION,
            COMMAND_TYPE,
            timestamp,
            local_key_id,
            DEVICE_ID,
            action_code,
            credentials.lock_secret.as_bytes(),
        )?;

        let mut bytes = [0u8; COMMAND_LEN];
        bytes[0..8].copy_from_slice(&MESSAGE_ID.to_be_bytes());
        bytes[8] = PROTOCOL_VERSION;
        bytes[9] = COMMAND_TYPE;
        bytes[10..18].copy_from_slice(&timestamp.to_be_bytes());
        bytes[18..50].copy_from_slice(&mac);
        bytes[50] = local_key_id;
        bytes[51] = DEVICE_ID;
        bytes[52] = action_code;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Standard base64 of the binary layout.
    pub fn to_base64(&self) -> String {
        use base64::engine::general_purpose::STANDARD as BASE64;
        use base64::Engine;
        BASE64.encode(self.bytes)
    }

    /// The opaque value for the `command_signed_base64` query parameter:
    /// base64, then percent-encoded.
    pub fn as_query_value(&self) -> String {
        utf8_percent_encode(&self.to_base64(), QUERY_VALUE_ESCAPES).to_string()
    }
}
