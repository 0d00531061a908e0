//! Setup verification.
//!
//! A new configuration is checked in two steps so the user learns whether
//! the bridge is unreachable or the credentials are wrong — the two need
//! different fixes. First the unauthenticated status endpoint proves
//! connectivity and yields the bridge MAC (the stable device identity);
//! then a signed webhook listing proves the API key is accepted.

use thiserror::Error;

use latchkey_client::{ClientError, StatusClient};
use latchkey_core::{ApiKey, BridgeTransport, LockStatus};
use latchkey_webhook::{WebhookError, WebhookRegistry};

/// Distinct, actionable setup outcomes.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("cannot connect to bridge: {0}")]
    CannotConnect(String),

    #[error("bridge rejected credentials")]
    InvalidAuth,
}

/// What a successful verification learned about the bridge.
#[derive(Debug, Clone)]
pub struct BridgeInfo {
    /// WiFi MAC of the bridge, used as the stable unique id for this
    /// device in the host's configuration store.
    pub mac: Option<String>,
    pub status: LockStatus,
}

/// Verify that `transport` reaches a bridge and that `api_key` is
/// accepted by it.
pub async fn verify_setup(
    transport: &dyn BridgeTransport,
    api_key: &ApiKey,
) -> Result<BridgeInfo, SetupError> {
    let status = StatusClient::new(transport)
        .get_status()
        .await
        .map_err(|e| match e {
            ClientError::BridgeUnavailable(code) => {
                SetupError::CannotConnect(format!("http {code}"))
            }
            other => SetupError::CannotConnect(other.to_string()),
        })?;

    match WebhookRegistry::new(transport, api_key).list().await {
        Ok(_) => Ok(BridgeInfo {
            mac: status.bridge_mac_wifi.clone(),
            status,
        }),
        Err(WebhookError::Rejected(_)) => Err(SetupError::InvalidAuth),
        Err(other) => Err(SetupError::CannotConnect(other.to_string())),
    }
}
