//! In-memory transport for testing.

use super::Transport;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{Mutex, PoisonError};

/// Transport recording every request instead of sending it.
///
/// Answers with `{"name": "projects/mock/messages/<n>"}`, or fails every
/// request when built with [`failing()`](Self::failing).
#[derive(Debug, Default)]
pub struct MockTransport {
    failure: Option<String>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    pub fn failing(description: impl Into<String>) -> Self {
        Self {
            failure: Some(description.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// `(endpoint, body)` of every request, in order.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let n = {
            let mut requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
            requests.push((endpoint.to_string(), body.clone()));
            requests.len()
        };
        if let Some(description) = &self.failure {
            exn::bail!(ErrorKind::Transport(description.clone()));
        }
        Ok(json!({ "name": format!("projects/mock/messages/{n}") }))
    }
}
