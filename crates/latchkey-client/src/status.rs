//! Unauthenticated status queries.

use std::time::Duration;

use latchkey_core::{BridgeRequest, BridgeTransport, LockStatus};

use crate::error::{ClientError, ClientResult};

/// Status polls back a periodic refresh loop; a hung bridge must fail the
/// cycle quickly rather than stall it, hence the tight bound.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for `GET /status`. Requires no credentials.
pub struct StatusClient<'a> {
    transport: &'a dyn BridgeTransport,
}

impl<'a> StatusClient<'a> {
    pub fn new(transport: &'a dyn BridgeTransport) -> Self {
        Self { transport }
    }

    /// Fetch the current lock/bridge snapshot.
    ///
    /// The body is parsed as JSON from raw bytes; some firmware labels it
    /// `text/html`.
    pub async fn get_status(&self) -> ClientResult<LockStatus> {
        let request = BridgeRequest::get("/status").with_timeout(STATUS_TIMEOUT);
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(ClientError::BridgeUnavailable(response.status));
        }
        Ok(response.json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use latchkey_core::{BoltState, BridgeResponse, CoreError, CoreResult};

    struct CannedTransport {
        status: u16,
        body: &'static [u8],
    }

    #[async_trait]
    impl BridgeTransport for CannedTransport {
        async fn execute(&self, request: BridgeRequest) -> CoreResult<BridgeResponse> {
            assert_eq!(request.path, "/status");
            assert_eq!(request.timeout, Some(STATUS_TIMEOUT));
            Ok(BridgeResponse {
                status: self.status,
                body: self.body.to_vec(),
            })
        }
    }

    #[tokio::test]
    async fn test_status_parses_mislabeled_json() {
        let transport = CannedTransport {
            status: 200,
            body: br#"{"bolt_state":"NIGHT_LOCK","bridge_mac_wifi":"aa:bb:cc","battery_percentage":91}"#,
        };
        let status = StatusClient::new(&transport).get_status().await.unwrap();
        assert_eq!(status.bolt_state(), BoltState::NightLock);
        assert_eq!(status.bridge_mac_wifi.as_deref(), Some("aa:bb:cc"));
    }

    #[tokio::test]
    async fn test_non_success_is_bridge_unavailable() {
        let transport = CannedTransport {
            status: 503,
            body: b"",
        };
        let err = StatusClient::new(&transport).get_status().await.unwrap_err();
        assert!(matches!(err, ClientError::BridgeUnavailable(503)));
    }

    #[tokio::test]
    async fn test_html_error_page_is_malformed_response() {
        let transport = CannedTransport {
            status: 200,
            body: b"<html>rebooting</html>",
        };
        let err = StatusClient::new(&transport).get_status().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(CoreError::MalformedResponse(_))
        ));
    }
}
