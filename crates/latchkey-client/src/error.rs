use thiserror::Error;

use latchkey_core::CoreError;

/// Error type for the latchkey-client crate.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The bridge answered a status query with a non-success status.
    #[error("bridge unavailable: http {0}")]
    BridgeUnavailable(u16),

    /// The bridge refused a signed lock command.
    #[error("lock command rejected: http {0}")]
    CommandRejected(u16),
}

/// Result type alias for latchkey-client operations.
pub type ClientResult<T> = Result<T, ClientError>;
