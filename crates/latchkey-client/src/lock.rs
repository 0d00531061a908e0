//! Signed lock actions.

use tracing::debug;

use latchkey_core::{ActionType, BridgeRequest, BridgeTransport, Credentials, SignedCommand};

use crate::error::{ClientError, ClientResult};

/// Client for issuing lock actions.
///
/// Every call builds a fresh [`SignedCommand`] (new timestamp, new MAC)
/// and sends it as the `command_signed_base64` query parameter. The
/// credentials never travel in any other form.
pub struct LockClient<'a> {
    transport: &'a dyn BridgeTransport,
    credentials: &'a Credentials,
}

impl<'a> LockClient<'a> {
    pub fn new(transport: &'a dyn BridgeTransport, credentials: &'a Credentials) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// Open the latch fully.
    pub async fn open(&self) -> ClientResult<()> {
        self.send(ActionType::Open).await
    }

    /// Release the night lock (day-lock position).
    pub async fn unlock(&self) -> ClientResult<()> {
        self.send(ActionType::Unlock).await
    }

    /// Engage the night lock.
    pub async fn lock(&self) -> ClientResult<()> {
        self.send(ActionType::Lock).await
    }

    async fn send(&self, action: ActionType) -> ClientResult<()> {
        let command = SignedCommand::build(action, self.credentials)?;
        let request = BridgeRequest::get(format!(
            "/to_lock?command_signed_base64={}",
            command.as_query_value()
        ));

        debug!(%action, "sending lock command");
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(ClientError::CommandRejected(response.status));
        }
        Ok(())
    }
}
