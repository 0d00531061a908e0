use thiserror::Error;

use latchkey_core::CoreError;

/// Error type for the latchkey-webhook crate.
///
/// Signature mismatches never appear here; they are boolean outcomes of
/// verification. These variants cover transport failures and remote-state
/// inconsistencies only, with messages safe to log.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The bridge answered a webhook-management request with a non-success
    /// status (bad signature headers, unknown id, firmware refusal).
    #[error("bridge rejected webhook request: http {0}")]
    Rejected(u16),

    /// A registration POST succeeded but the re-fetched list does not
    /// contain the callback URL. Remote state is inconsistent; retrying
    /// blindly could register duplicates, so this is fatal to setup.
    #[error("registered webhook not visible on re-fetch")]
    RegistrationNotVisible,
}

/// Result type alias for latchkey-webhook operations.
pub type WebhookResult<T> = Result<T, WebhookError>;
