//! Push-notification client.
//!
//! [`PushClient::initialize`] reads the service account credential named by
//! the configuration and refuses to construct a client when it is missing or
//! malformed. Callers are expected to treat that as fatal: there is no
//! degraded mode in which notifications are silently dropped.
//!
//! Messages are rendered into the provider's v1 `messages:send` body and handed
//! to a [`Transport`](transport::Transport).

mod credentials;
pub mod error;
mod message;
pub mod transport;

pub use crate::credentials::ServiceAccount;
pub use crate::message::{Message, MessageId, Notification, Target};
use crate::error::{ErrorKind, Result};
use crate::transport::TransportHandle;
use async_trait::async_trait;
use exn::ResultExt;
use pulse_config::PushConfig;

const ENDPOINT_BASE: &str = "https://fcm.googleapis.com/v1/projects";

/// Anything able to hand a [`Message`] over to the messaging provider.
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, message: &Message) -> Result<MessageId>;
}

/// Messaging client bound to one service account.
pub struct PushClient {
    account: ServiceAccount,
    database_url: String,
    transport: TransportHandle,
}

impl PushClient {
    /// Load the credential and build a client.
    ///
    /// # Errors
    ///
    /// [`CredentialNotFound`](ErrorKind::CredentialNotFound) when the file does
    /// not exist, [`InvalidCredential`](ErrorKind::InvalidCredential) when it
    /// cannot be read or parsed.
    pub fn initialize(config: &PushConfig, transport: TransportHandle) -> Result<Self> {
        let path = &config.service_account_path;
        let account = ServiceAccount::load(path).inspect_err(|err| {
            tracing::error!(path = %path.display(), error = ?err, "Unable to load service account");
        })?;
        tracing::info!(
            project_id = %account.project_id,
            database_url = %config.database_url,
            transport = transport.name(),
            "Push client initialized"
        );
        Ok(Self {
            account,
            database_url: config.database_url.clone(),
            transport,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.account.project_id
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn endpoint(&self) -> String {
        format!("{ENDPOINT_BASE}/{}/messages:send", self.account.project_id)
    }
}

#[async_trait]
impl PushSender for PushClient {
    async fn send(&self, message: &Message) -> Result<MessageId> {
        message.validate()?;
        let endpoint = self.endpoint();
        let response = self
            .transport
            .post(&endpoint, &message.to_request())
            .await
            .or_raise(|| ErrorKind::Delivery)?;
        let Some(name) = response.get("name").and_then(|name| name.as_str()) else {
            exn::bail!(ErrorKind::Transport(format!("response has no message name: {response}")));
        };
        tracing::debug!(recipient = ?message.target, message = name, "Push message accepted");
        Ok(MessageId(name.to_string()))
    }
}
