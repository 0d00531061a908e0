use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

use crate::error::{CoreError, CoreResult};

/// Current unix time in whole seconds.
pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

// ---------------------------------------------------------------------------
// ApiKey — base64-delivered webhook signing key
// ---------------------------------------------------------------------------

/// The bridge's webhook API key, decoded from its base64 transport form at
/// construction time. The decoded bytes key every webhook signature, both
/// the headers we stamp on management requests and the verification of
/// inbound deliveries. Never serialized, never logged.
#[derive(Clone)]
pub struct ApiKey {
    decoded: Zeroizing<Vec<u8>>,
}

impl ApiKey {
    /// Decode a base64 key. Malformed input fails here, before any
    /// signature is computed or any request is sent.
    pub fn from_base64(encoded: &str) -> CoreResult<Self> {
        let decoded = BASE64
            .decode(encoded.trim())
            .map_err(|_| CoreError::InvalidKeyEncoding)?;
        Ok(Self {
            decoded: Zeroizing::new(decoded),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.decoded
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(<{} bytes>)", self.decoded.len())
    }
}

// ---------------------------------------------------------------------------
// LockSecret — base64-delivered HMAC key for lock commands
// ---------------------------------------------------------------------------

/// The pre-shared secret for the lock's local key slot. Same handling
/// rules as [`ApiKey`]; the two key different signature schemes and are
/// deliberately distinct types so they cannot be swapped at a call site.
#[derive(Clone)]
pub struct LockSecret {
    decoded: Zeroizing<Vec<u8>>,
}

impl LockSecret {
    pub fn from_base64(encoded: &str) -> CoreResult<Self> {
        let decoded = BASE64
            .decode(encoded.trim())
            .map_err(|_| CoreError::InvalidKeyEncoding)?;
        Ok(Self {
            decoded: Zeroizing::new(decoded),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.decoded
    }
}

impl fmt::Debug for LockSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LockSecret(<{} bytes>)", self.decoded.len())
    }
}

// ---------------------------------------------------------------------------
// LocalKeyId — one-byte pre-shared key slot identifier
// ---------------------------------------------------------------------------

/// Identifies which key slot on the lock authenticates a command. The wire
/// format allots a single byte; wider inputs are range-checked up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalKeyId(u8);

impl LocalKeyId {
    pub fn new(id: u8) -> Self {
        Self(id)
    }

    pub fn as_byte(self) -> u8 {
        self.0
    }
}

impl TryFrom<u64> for LocalKeyId {
    type Error = CoreError;

    fn try_from(value: u64) -> CoreResult<Self> {
        u8::try_from(value)
            .map(Self)
            .map_err(|_| CoreError::KeyIdOutOfRange)
    }
}

impl fmt::Display for LocalKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Credentials — full pre-shared credential set for one bridge
// ---------------------------------------------------------------------------

/// Immutable credential set for a configured bridge. Built once from the
/// host's configuration store and passed by reference into each operation;
/// there is no hidden shared client state.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: ApiKey,
    pub local_key_id: LocalKeyId,
    pub lock_secret: LockSecret,
}

impl Credentials {
    pub fn new(api_key: ApiKey, local_key_id: LocalKeyId, lock_secret: LockSecret) -> Self {
        Self {
            api_key,
            local_key_id,
            lock_secret,
        }
    }
}

// ---------------------------------------------------------------------------
// ActionType — closed set of lock actions with fixed wire codes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    Open,
    Unlock,
    Lock,
}

impl ActionType {
    /// One-byte wire code carried in the signed command.
    pub fn wire_code(self) -> u8 {
        match self {
            ActionType::Open => 1,
            ActionType::Unlock => 2,
            ActionType::Lock => 3,
        }
    }

    pub fn from_wire_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ActionType::Open),
            2 => Some(ActionType::Unlock),
            3 => Some(ActionType::Lock),
            _ => None,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::Open => write!(f, "open"),
            ActionType::Unlock => write!(f, "unlock"),
            ActionType::Lock => write!(f, "lock"),
        }
    }
}

// ---------------------------------------------------------------------------
// BoltState — the lock positions the bridge reports
// ---------------------------------------------------------------------------

/// Reported lock position. Status and event payloads spell these as
/// uppercase snake-case strings; anything unrecognized maps to `Unknown`
/// rather than failing the whole message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoltState {
    Open,
    DayLock,
    NightLock,
    Unknown,
}

impl BoltState {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "OPEN" => BoltState::Open,
            "DAY_LOCK" => BoltState::DayLock,
            "NIGHT_LOCK" => BoltState::NightLock,
            _ => BoltState::Unknown,
        }
    }
}

impl fmt::Display for BoltState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoltState::Open => write!(f, "open"),
            BoltState::DayLock => write!(f, "day_lock"),
            BoltState::NightLock => write!(f, "night_lock"),
            BoltState::Unknown => write!(f, "unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// LockStatus — typed snapshot of GET /status
// ---------------------------------------------------------------------------

/// Snapshot returned by the bridge's unauthenticated status endpoint.
/// The firmware's JSON is loosely shaped and occasionally grows fields, so
/// everything is optional and unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LockStatus {
    #[serde(default)]
    pub bolt_state: Option<String>,
    #[serde(default)]
    pub bridge_mac_wifi: Option<String>,
    #[serde(default)]
    pub battery_percentage: Option<i64>,
    #[serde(default)]
    pub wifi_strength: Option<i64>,
    #[serde(default)]
    pub ble_strength: Option<i64>,
}

impl LockStatus {
    pub fn bolt_state(&self) -> BoltState {
        self.bolt_state
            .as_deref()
            .map(BoltState::parse)
            .unwrap_or(BoltState::Unknown)
    }
}

// ---------------------------------------------------------------------------
// EventMessage — typed body of an authenticated webhook delivery
// ---------------------------------------------------------------------------

/// How a reported state change should be interpreted: the bolt has either
/// settled in a position or is moving toward one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTransition {
    Settled(BoltState),
    Moving(BoltState),
}

/// Parsed webhook delivery body. Must only be constructed after the raw
/// body passed signature verification; nothing here re-checks that.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventMessage {
    #[serde(default)]
    pub requested_state: Option<String>,
    #[serde(default)]
    pub go_to_state: Option<String>,
    #[serde(default)]
    pub bolt_state: Option<String>,
    #[serde(default)]
    pub battery_percentage: Option<i64>,
    #[serde(default)]
    pub wifi_strength: Option<i64>,
    #[serde(default)]
    pub ble_strength: Option<i64>,
    #[serde(default)]
    pub mac_wifi: Option<String>,
}

impl EventMessage {
    /// Derive the lock transition this event describes.
    ///
    /// Precedence: `requested_state` (the bolt settled where it was asked
    /// to go), then `go_to_state` (movement in progress), then
    /// `bolt_state` (plain position report). Events carrying none of the
    /// three (battery, signal strength) yield `None`.
    pub fn lock_transition(&self) -> Option<LockTransition> {
        if let Some(raw) = self.requested_state.as_deref() {
            return Some(LockTransition::Settled(BoltState::parse(raw)));
        }
        if let Some(raw) = self.go_to_state.as_deref() {
            return Some(LockTransition::Moving(BoltState::parse(raw)));
        }
        self.bolt_state
            .as_deref()
            .map(|raw| LockTransition::Settled(BoltState::parse(raw)))
    }
}
