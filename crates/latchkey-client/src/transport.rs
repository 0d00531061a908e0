//! reqwest-backed implementation of the bridge transport seam.

use async_trait::async_trait;
use std::time::Duration;

use latchkey_core::{
    BridgeRequest, BridgeResponse, BridgeTransport, CoreError, CoreResult, RequestMethod,
};

/// Default per-request bound. The bridge can take a long time to answer
/// management requests while the lock radio is busy, so this is generous;
/// status queries override it downward.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// HTTP transport for one bridge, addressed by host (and optional port)
/// on the local network. The bridge speaks plaintext HTTP only.
///
/// The inner reqwest client pools connections and is cheap to clone;
/// sharing one transport across concurrent operations is the intended
/// usage.
#[derive(Debug, Clone)]
pub struct HttpBridgeTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBridgeTransport {
    pub fn new(address: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("http://{}", address.trim_end_matches('/')),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl BridgeTransport for HttpBridgeTransport {
    async fn execute(&self, request: BridgeRequest) -> CoreResult<BridgeResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            RequestMethod::Get => self.client.get(&url),
            RequestMethod::Post => self.client.post(&url),
            RequestMethod::Delete => self.client.delete(&url),
        };

        builder = builder.timeout(request.timeout.unwrap_or(self.timeout));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.json_body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CoreError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| CoreError::Transport(e.to_string()))?
            .to_vec();

        Ok(BridgeResponse { status, body })
    }
}
