//! Signed webhook-management operations.
//!
//! Each operation stamps its own fresh `timestamp`/`hash` header pair over
//! the scheme-specific signing payload: the empty body for listing,
//! `url || flags_be4` for registration, `id_be8` for removal. All traffic
//! goes through the [`BridgeTransport`] seam.

use serde::Serialize;
use tracing::debug;

use latchkey_core::{
    message_signature, unix_now, ApiKey, BridgeRequest, BridgeTransport,
};

use crate::error::{WebhookError, WebhookResult};
use crate::flags::{EventFlags, TriggerFields};

// ---------------------------------------------------------------------------
// WebhookEntry — the bridge's view of one registration
// ---------------------------------------------------------------------------

/// One registration as reported by the bridge. The listing endpoint
/// returns loosely-shaped JSON; only entries carrying a numeric `id` and
/// a string `url` become entries, anything else is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEntry {
    pub id: u64,
    pub url: String,
}

#[derive(Serialize)]
struct RegistrationBody<'a> {
    url: &'a str,
    #[serde(flatten)]
    triggers: TriggerFields,
}

// ---------------------------------------------------------------------------
// WebhookRegistry — list / register / remove
// ---------------------------------------------------------------------------

/// Client for the bridge's webhook-management endpoints, parameterized by
/// the transport and the webhook API key. Holds no mutable state; the
/// bridge's list is re-fetched whenever current knowledge is needed.
pub struct WebhookRegistry<'a> {
    transport: &'a dyn BridgeTransport,
    key: &'a ApiKey,
}

impl<'a> WebhookRegistry<'a> {
    pub fn new(transport: &'a dyn BridgeTransport, key: &'a ApiKey) -> Self {
        Self { transport, key }
    }

    /// Fetch the registrations currently on the bridge.
    pub async fn list(&self) -> WebhookResult<Vec<WebhookEntry>> {
        let now = unix_now();
        let signature = message_signature(b"", now, self.key.as_bytes());
        let request = BridgeRequest::get("/webhooks").with_signature(now, signature);

        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(WebhookError::Rejected(response.status));
        }

        let raw: Vec<serde_json::Value> = response.json()?;
        let mut entries = Vec::with_capacity(raw.len());
        for value in raw {
            let id = value.get("id").and_then(serde_json::Value::as_u64);
            let url = value.get("url").and_then(serde_json::Value::as_str);
            match (id, url) {
                (Some(id), Some(url)) => entries.push(WebhookEntry {
                    id,
                    url: url.to_string(),
                }),
                _ => debug!(?value, "skipping malformed webhook list entry"),
            }
        }
        Ok(entries)
    }

    /// Register a webhook for `url` firing on `flags`.
    ///
    /// The signature covers the URL bytes followed by the 4-byte
    /// big-endian flag word; the body expands the flags into the nine
    /// named trigger fields.
    pub async fn register(&self, url: &str, flags: EventFlags) -> WebhookResult<()> {
        let now = unix_now();
        let mut payload = url.as_bytes().to_vec();
        payload.extend_from_slice(&flags.to_signing_bytes());
        let signature = message_signature(&payload, now, self.key.as_bytes());

        let body = serde_json::to_value(RegistrationBody {
            url,
            triggers: TriggerFields::from(flags),
        })
        .map_err(|e| latchkey_core::CoreError::MalformedResponse(e.to_string()))?;

        let request = BridgeRequest::post("/webhooks", body).with_signature(now, signature);
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(WebhookError::Rejected(response.status));
        }
        Ok(())
    }

    /// Remove the registration with the given bridge-assigned id.
    ///
    /// The signature covers the 8-byte big-endian id. HTTP success is the
    /// only success criterion.
    pub async fn remove(&self, id: u64) -> WebhookResult<()> {
        let now = unix_now();
        let signature = message_signature(&id.to_be_bytes(), now, self.key.as_bytes());
        let request =
            BridgeRequest::delete(format!("/webhooks/{id}")).with_signature(now, signature);

        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(WebhookError::Rejected(response.status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use latchkey_core::{BridgeResponse, CoreResult, RequestMethod, HASH_HEADER, TIMESTAMP_HEADER};
    use std::sync::Mutex;

    /// Records requests and replays canned responses.
    struct ScriptedTransport {
        requests: Mutex<Vec<BridgeRequest>>,
        responses: Mutex<Vec<BridgeResponse>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<BridgeResponse>) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                responses: Mutex::new(responses),
            }
        }

        fn ok(body: &str) -> BridgeResponse {
            BridgeResponse {
                status: 200,
                body: body.as_bytes().to_vec(),
            }
        }

        fn taken(&self) -> Vec<BridgeRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BridgeTransport for ScriptedTransport {
        async fn execute(&self, request: BridgeRequest) -> CoreResult<BridgeResponse> {
            self.requests.lock().unwrap().push(request);
            Ok(self.responses.lock().unwrap().remove(0))
        }
    }

    fn key() -> ApiKey {
        ApiKey::from_base64("YWJj").unwrap()
    }

    fn header<'r>(request: &'r BridgeRequest, name: &str) -> Option<&'r str> {
        request
            .headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn test_list_parses_well_formed_entries() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(
            r#"[{"id":7,"url":"http://cb/a"},{"id":9,"url":"http://cb/b"}]"#,
        )]);
        let key = key();
        let entries = WebhookRegistry::new(&transport, &key).list().await.unwrap();
        assert_eq!(
            entries,
            vec![
                WebhookEntry {
                    id: 7,
                    url: "http://cb/a".into()
                },
                WebhookEntry {
                    id: 9,
                    url: "http://cb/b".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_list_skips_entries_missing_id_or_url() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(
            r#"[{"id":7,"url":"http://cb/a"},{"url":"http://cb/orphan"},{"id":"nine","url":"http://cb/b"},{"id":3}]"#,
        )]);
        let key = key();
        let entries = WebhookRegistry::new(&transport, &key).list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, 7);
    }

    #[tokio::test]
    async fn test_list_signs_empty_body() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok("[]")]);
        let key = key();
        WebhookRegistry::new(&transport, &key).list().await.unwrap();

        let requests = transport.taken();
        let ts: u64 = header(&requests[0], TIMESTAMP_HEADER)
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(
            header(&requests[0], HASH_HEADER).unwrap(),
            message_signature(b"", ts, b"abc")
        );
    }

    #[tokio::test]
    async fn test_register_signs_url_and_flags() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok("")]);
        let key = key();
        WebhookRegistry::new(&transport, &key)
            .register("http://cb/a", EventFlags::ALL)
            .await
            .unwrap();

        let requests = transport.taken();
        assert_eq!(requests[0].method, RequestMethod::Post);
        let ts: u64 = header(&requests[0], TIMESTAMP_HEADER)
            .unwrap()
            .parse()
            .unwrap();
        let mut payload = b"http://cb/a".to_vec();
        payload.extend_from_slice(&[0, 0, 1, 255]);
        assert_eq!(
            header(&requests[0], HASH_HEADER).unwrap(),
            message_signature(&payload, ts, b"abc")
        );

        let body = requests[0].json_body.as_ref().unwrap();
        assert_eq!(body["url"], "http://cb/a");
        assert_eq!(body["trigger_online_status"], serde_json::json!(true));
    }

    #[tokio::test]
    async fn test_remove_signs_big_endian_id() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok("")]);
        let key = key();
        WebhookRegistry::new(&transport, &key).remove(42).await.unwrap();

        let requests = transport.taken();
        assert_eq!(requests[0].method, RequestMethod::Delete);
        assert_eq!(requests[0].path, "/webhooks/42");
        let ts: u64 = header(&requests[0], TIMESTAMP_HEADER)
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(
            header(&requests[0], HASH_HEADER).unwrap(),
            message_signature(&42u64.to_be_bytes(), ts, b"abc")
        );
    }

    #[tokio::test]
    async fn test_non_success_surfaces_as_rejected() {
        let transport = ScriptedTransport::new(vec![BridgeResponse {
            status: 401,
            body: Vec::new(),
        }]);
        let key = key();
        let err = WebhookRegistry::new(&transport, &key)
            .list()
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookError::Rejected(401)));
    }
}
