//! Latchkey protocol core.
//!
//! Everything in this crate is pure and transport-free: credential types,
//! the signature engine shared by command signing and webhook verification,
//! the signed binary command encoder, and the narrow request/response
//! contract the async client implements. No socket is ever owned here.

pub mod command;
pub mod crypto;
pub mod error;
pub mod traits;
pub mod types;

pub use command::*;
pub use crypto::*;
pub use error::*;
pub use traits::*;
pub use types::*;
