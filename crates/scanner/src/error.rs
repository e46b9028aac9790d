//! Scanner Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. These never cross the bridge as-is: the invoker
//! flattens them into a `SCAN_ERROR` signal carrying their description.

use derive_more::{Display, Error};
use std::io::Error as IoError;

/// A scanner error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for scanner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No indexing program could be located; configure one explicitly.
    #[display("indexer not found: {_0}")]
    IndexerNotFound(#[error(not(source))] String),
    /// The indexing facility refused the request outright.
    #[display("indexer rejected request: {_0}")]
    Rejected(#[error(not(source))] String),
    /// Starting the indexer process failed.
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
