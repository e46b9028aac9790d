//! Notification messages and their wire form.

use crate::error::{ErrorKind, Result};
use derive_more::Display;
use serde::Serialize;
use std::collections::BTreeMap;

/// Who receives a message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// A single device registration token.
    Token(String),
    /// Every device subscribed to the topic (name without `/topics/`).
    Topic(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Notification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// A push message: a target plus a displayable notification and/or a data
/// payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Message {
    #[serde(flatten)]
    pub target: Target,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}
impl Message {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            notification: None,
            data: BTreeMap::new(),
        }
    }

    pub fn with_notification(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.notification = Some(Notification {
            title: Some(title.into()),
            body: Some(body.into()),
        });
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Reject messages the provider would refuse anyway.
    pub fn validate(&self) -> Result<()> {
        match &self.target {
            Target::Token(token) if token.trim().is_empty() => {
                exn::bail!(ErrorKind::InvalidMessage("device token is empty".to_string()))
            },
            Target::Topic(topic) if !is_valid_topic(topic) => {
                exn::bail!(ErrorKind::InvalidMessage(format!("invalid topic name `{topic}`")))
            },
            _ => {},
        }
        let has_notification = self.notification.as_ref().is_some_and(|n| n.title.is_some() || n.body.is_some());
        if !has_notification && self.data.is_empty() {
            exn::bail!(ErrorKind::InvalidMessage("message has neither notification nor data".to_string()));
        }
        Ok(())
    }

    /// The provider's v1 `messages:send` request body.
    pub fn to_request(&self) -> serde_json::Value {
        serde_json::json!({ "message": self })
    }
}

/// Topic names are limited to `[a-zA-Z0-9-_.~%]+`.
fn is_valid_topic(topic: &str) -> bool {
    !topic.is_empty()
        && topic.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~' | '%'))
}

/// Provider-assigned identifier of an accepted message.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub struct MessageId(pub String);
