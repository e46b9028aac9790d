//! Boundary Error Types
//!
//! Unlike the other crates in this workspace these are not `exn` trees: an
//! [`ErrorSignal`] is a value that crosses the dispatch boundary and gets
//! serialized back to the caller, so it only carries a code and a message.

use derive_more::{Display, Error};
use serde::Serialize;

/// The single terminal outcome of a command.
pub type Resolution = std::result::Result<serde_json::Value, ErrorSignal>;

/// Error codes surfaced to callers of the bridge.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A required argument was absent or had the wrong type.
    #[display("INVALID_ARGUMENT")]
    InvalidArgument,
    /// The file named by the command does not exist.
    #[display("FILE_NOT_FOUND")]
    FileNotFound,
    /// The indexing facility faulted.
    #[display("SCAN_ERROR")]
    ScanError,
    /// No handler is registered under the command's name.
    #[display("UNIMPLEMENTED")]
    Unimplemented,
}

/// A tagged error delivered to the caller in place of a success value.
///
/// Serializes as `{"error": "<CODE>", "message": "..."}`.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq, Serialize)]
#[display("{code}: {message}")]
pub struct ErrorSignal {
    #[serde(rename = "error")]
    pub code: ErrorCode,
    pub message: String,
}
impl ErrorSignal {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    pub fn file_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::FileNotFound, message)
    }

    pub fn scan_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ScanError, message)
    }

    pub fn unimplemented(command: &str) -> Self {
        Self::new(ErrorCode::Unimplemented, format!("no handler registered for `{command}`"))
    }
}
