use thiserror::Error;

/// Error type for the latchkey-core crate.
///
/// Input errors fail before any network traffic; transport errors carry
/// only connectivity context. No variant ever embeds secret material.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A credential was not valid base64.
    #[error("invalid base64 key encoding")]
    InvalidKeyEncoding,

    /// A local key id outside the one-byte range the wire format allows.
    #[error("local key id out of range (0-255)")]
    KeyIdOutOfRange,

    /// HMAC initialization failed.
    #[error("crypto failure")]
    Crypto,

    /// The bridge answered with a body that does not parse as expected.
    #[error("malformed bridge response: {0}")]
    MalformedResponse(String),

    /// The bridge could not be reached or the request did not complete.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type alias for latchkey-core operations.
pub type CoreResult<T> = Result<T, CoreError>;
