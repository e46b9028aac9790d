//! Transports carry rendered requests to the messaging provider.

#[cfg(any(test, feature = "mock"))]
mod mock;

#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockTransport;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub type TransportHandle = Arc<dyn Transport + Send + Sync>;

/// Delivery of JSON requests to the provider.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Name of the transport (used for logging only).
    fn name(&self) -> &str;

    /// POST `body` to `endpoint`, returning the provider's JSON response.
    async fn post(&self, endpoint: &str, body: &Value) -> Result<Value>;
}

/// Transport that never talks to the provider.
///
/// Every request is logged as an [`info event`](tracing::Event) and answered
/// with a synthetic message name, so the rest of the pipeline can run without
/// credentials being exercised against the network.
#[derive(Debug, Default)]
pub struct DryRunTransport {
    sent: AtomicU64,
}
impl DryRunTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for DryRunTransport {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let n = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(%endpoint, %body, "Skipping push delivery during dry-run mode");
        let project = endpoint.trim_end_matches(":send").trim_end_matches("/messages");
        let project = project.rsplit_once("/v1/").map_or(project, |(_, path)| path);
        Ok(json!({ "name": format!("{project}/messages/dry-run-{n}") }))
    }
}
