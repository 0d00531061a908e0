use async_trait::async_trait;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// Header names the bridge uses for webhook-scheme authentication.
pub const TIMESTAMP_HEADER: &str = "timestamp";
pub const HASH_HEADER: &str = "hash";

// ---------------------------------------------------------------------------
// BridgeTransport — the only seam between protocol logic and the network
//
// The core crates build requests and interpret responses; an implementor
// (reqwest in latchkey-client, a mock in tests) moves the bytes. Non-2xx
// statuses are data, not transport errors: status decisions belong to the
// protocol layer.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Delete,
}

#[derive(Debug, Clone)]
pub struct BridgeRequest {
    pub method: RequestMethod,
    /// Path plus query string, already encoded (e.g. `/webhooks`,
    /// `/to_lock?command_signed_base64=...`).
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub json_body: Option<serde_json::Value>,
    /// Per-request bound; the transport supplies its default when `None`.
    pub timeout: Option<Duration>,
}

impl BridgeRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Get, path)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        let mut request = Self::new(RequestMethod::Post, path);
        request.json_body = Some(body);
        request
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Delete, path)
    }

    fn new(method: RequestMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            json_body: None,
            timeout: None,
        }
    }

    /// Stamp the webhook-scheme auth headers onto this request.
    pub fn with_signature(mut self, timestamp: u64, signature: String) -> Self {
        self.headers
            .push((TIMESTAMP_HEADER.to_string(), timestamp.to_string()));
        self.headers.push((HASH_HEADER.to_string(), signature));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone)]
pub struct BridgeResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl BridgeResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the raw body as JSON.
    ///
    /// Always parses bytes directly: some firmware labels JSON responses
    /// as `text/html`, so any content-type the transport saw is ignored.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> CoreResult<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| CoreError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
pub trait BridgeTransport: Send + Sync {
    async fn execute(&self, request: BridgeRequest) -> CoreResult<BridgeResponse>;
}
