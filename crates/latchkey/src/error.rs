use thiserror::Error;

use crate::setup::SetupError;

/// Error type for the latchkey binary, aggregating errors from the
/// library crates.
#[derive(Debug, Error)]
pub enum RootError {
    #[error("protocol error: {0}")]
    Core(#[from] latchkey_core::CoreError),

    #[error("webhook error: {0}")]
    Webhook(#[from] latchkey_webhook::WebhookError),

    #[error("client error: {0}")]
    Client(#[from] latchkey_client::ClientError),

    #[error("setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for RootError {
    fn from(e: toml::de::Error) -> Self {
        RootError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for RootError {
    fn from(e: serde_json::Error) -> Self {
        RootError::Serialization(e.to_string())
    }
}

/// Result type alias for the latchkey binary.
pub type RootResult<T> = Result<T, RootError>;
