//! Latchkey host binary library.
//!
//! Wires the protocol crates into a usable integration: TOML
//! configuration, setup verification with distinct cannot-connect vs
//! invalid-auth outcomes, and the axum receiver that turns authenticated
//! bridge deliveries into typed events.

pub mod config;
pub mod error;
pub mod receiver;
pub mod setup;

pub use config::LatchkeyConfig;
pub use error::{RootError, RootResult};
pub use receiver::{build_router, ReceiverState};
pub use setup::{verify_setup, BridgeInfo, SetupError};
