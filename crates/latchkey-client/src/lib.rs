//! Async HTTP client for the bridge.
//!
//! [`HttpBridgeTransport`] is the reqwest-backed implementation of the
//! core's transport seam; [`StatusClient`] and [`LockClient`] are the two
//! operation surfaces built on it. No retries live here: a failed call
//! surfaces once, and retry policy belongs to the caller's scheduler.

pub mod error;
pub mod lock;
pub mod status;
pub mod transport;

pub use error::{ClientError, ClientResult};
pub use lock::LockClient;
pub use status::StatusClient;
pub use transport::{HttpBridgeTransport, DEFAULT_TIMEOUT};
