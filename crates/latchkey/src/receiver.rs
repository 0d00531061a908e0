//! Inbound webhook receiver.
//!
//! One endpoint: `POST /webhook/{token}`. The raw body is verified
//! against the `timestamp`/`hash` headers before any JSON parsing or
//! dispatch; anything inauthentic is dropped. Invalid deliveries still
//! answer 200 so the response reveals nothing about why a forgery failed.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use latchkey_core::{EventMessage, HASH_HEADER, TIMESTAMP_HEADER};
use latchkey_webhook::{InboundMessage, MessageVerifier};

/// Shared state for the receiver.
pub struct ReceiverState {
    pub verifier: MessageVerifier,
    /// Random path token; requests to any other path are not deliveries.
    pub token: String,
    /// Verified events flow out here for the host to consume.
    pub events: mpsc::Sender<EventMessage>,
}

/// Build the receiver router.
pub fn build_router(state: Arc<ReceiverState>) -> Router {
    Router::new()
        .route("/webhook/{token}", post(handle_delivery))
        .with_state(state)
}

async fn handle_delivery(
    State(state): State<Arc<ReceiverState>>,
    Path(token): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if token != state.token {
        return StatusCode::NOT_FOUND;
    }

    let message = InboundMessage::from_parts(
        body.to_vec(),
        headers.get(TIMESTAMP_HEADER).and_then(|v| v.to_str().ok()),
        headers.get(HASH_HEADER).and_then(|v| v.to_str().ok()),
    );

    if !state.verifier.verify(&message) {
        return StatusCode::OK;
    }

    match serde_json::from_slice::<EventMessage>(&message.body) {
        Ok(event) => {
            if state.events.try_send(event).is_err() {
                warn!("event channel full or closed; delivery dropped");
            }
        }
        Err(err) => {
            debug!(error = %err, "authenticated delivery with unparseable body");
        }
    }
    StatusCode::OK
}
