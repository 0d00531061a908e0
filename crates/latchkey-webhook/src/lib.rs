//! Latchkey webhook layer.
//!
//! Authenticates inbound event deliveries from the bridge and manages the
//! bridge-side webhook registrations that produce them:
//!
//! - Inbound verification: recompute-and-compare signatures in constant
//!   time, with a ±60 second replay window on the delivery timestamp.
//! - Event flags: the 9-bit trigger mask and its expansion into the
//!   registration body's named boolean fields.
//! - Registry operations: signed list/register/remove against the
//!   transport seam; never against a socket directly.
//! - Reconciliation: idempotently ensure exactly one registration exists
//!   for a callback URL, safe to re-run on every startup.
//!
//! Verification failures are values, not errors: an inauthentic message
//! yields `false` and is dropped by the caller. Only transport and
//! protocol-inconsistency conditions surface as [`WebhookError`].

pub mod auth;
pub mod error;
pub mod flags;
pub mod reconcile;
pub mod registry;

pub use auth::{InboundMessage, MessageVerifier, ALLOWED_DRIFT_SECONDS};
pub use error::{WebhookError, WebhookResult};
pub use flags::{EventFlags, TriggerFields};
pub use reconcile::{ensure_webhook, remove_webhook};
pub use registry::{WebhookEntry, WebhookRegistry};
