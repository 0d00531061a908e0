//! Idempotent webhook reconciliation.
//!
//! Startup must guarantee exactly one registration exists for this
//! integration's callback URL, without trusting any id remembered from an
//! earlier run. The bridge offers no locking primitive, so reconciliation
//! assumes a single writer per bridge; two hosts reconciling the same
//! bridge concurrently can double-register.

use tracing::{info, warn};

use crate::error::{WebhookError, WebhookResult};
use crate::flags::EventFlags;
use crate::registry::WebhookRegistry;

/// Ensure a registration for `callback_url` exists and return its
/// bridge-assigned id.
///
/// Fetches the current list and matches by exact URL; the caller must
/// pass an already-normalized URL. When absent, registers and re-fetches
/// to learn the assigned id; an id is only ever derived from a
/// just-fetched list. If the bridge accepts the registration but the
/// re-fetched list still lacks the URL, remote state is inconsistent and
/// the error propagates rather than retrying into a duplicate.
pub async fn ensure_webhook(
    registry: &WebhookRegistry<'_>,
    callback_url: &str,
    flags: EventFlags,
) -> WebhookResult<u64> {
    let existing = registry.list().await?;
    if let Some(entry) = existing.iter().find(|e| e.url == callback_url) {
        info!(id = entry.id, "webhook already registered");
        return Ok(entry.id);
    }

    registry.register(callback_url, flags).await?;

    let refreshed = registry.list().await?;
    match refreshed.iter().find(|e| e.url == callback_url) {
        Some(entry) => {
            info!(id = entry.id, "webhook registered");
            Ok(entry.id)
        }
        None => Err(WebhookError::RegistrationNotVisible),
    }
}

/// Best-effort removal of a registration.
///
/// Cleanup failing must not take the integration lifecycle down with it:
/// the outcome is reported as a boolean and failures are logged, never
/// escalated.
pub async fn remove_webhook(registry: &WebhookRegistry<'_>, id: u64) -> bool {
    match registry.remove(id).await {
        Ok(()) => {
            info!(id, "webhook removed");
            true
        }
        Err(err) => {
            warn!(id, error = %err, "webhook removal failed");
            false
        }
    }
}
