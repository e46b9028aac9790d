//! Push Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A push error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for push operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Service account file does not exist. Fatal at startup.
    #[display("service account file not found: {}", _0.display())]
    CredentialNotFound(#[error(not(source))] PathBuf),
    /// Service account file is unreadable, not JSON, or missing fields. Fatal
    /// at startup.
    #[display("invalid service account file: {}", _0.display())]
    InvalidCredential(#[error(not(source))] PathBuf),
    /// The message cannot be sent as constructed; fix it before retrying.
    #[display("invalid message: {_0}")]
    InvalidMessage(#[error(not(source))] String),
    /// The transport failed to deliver a request to the provider.
    #[display("transport error: {_0}")]
    Transport(#[error(not(source))] String),
    /// A message could not be handed over to the provider.
    #[display("message delivery failed")]
    Delivery,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Delivery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::CredentialNotFound(PathBuf::from("./service-account-key.json")).to_string(),
            "service account file not found: ./service-account-key.json"
        );
        assert_eq!(ErrorKind::InvalidMessage("empty topic".to_string()).to_string(), "invalid message: empty topic");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(!ErrorKind::CredentialNotFound(PathBuf::new()).is_retryable());
        assert!(!ErrorKind::InvalidCredential(PathBuf::new()).is_retryable());
        assert!(!ErrorKind::InvalidMessage(String::new()).is_retryable());
        assert!(ErrorKind::Transport(String::new()).is_retryable());
        assert!(ErrorKind::Delivery.is_retryable());
    }
}
