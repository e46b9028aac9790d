//! Media-indexing facility trait and implementations.
//!
//! The facility is callback-driven: [`MediaIndexer::scan`] either rejects the
//! request synchronously or accepts it and later fires the [`Completion`] it
//! was given, usually from a thread it owns. A completion can only fire once
//! (it is consumed), and the receiving half hands the outcome back to whichever
//! task is waiting on it.

mod command;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::command::CommandIndexer;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::{MockIndexer, MockReply};
use crate::error::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::oneshot;

pub type IndexerHandle = Arc<dyn MediaIndexer + Send + Sync>;

/// What the facility reported for a scanned path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scanned {
    pub path: PathBuf,
    /// Opaque resource identifier (for example `content://media/external/images/media/123`).
    /// `None` when the facility declined or failed to index the file.
    pub identifier: Option<String>,
}
impl Scanned {
    /// An identifier that is present but blank counts as absent.
    pub fn is_found(&self) -> bool {
        self.identifier.as_deref().is_some_and(|id| !id.trim().is_empty())
    }
}

/// One-shot completion callback handed to a [`MediaIndexer`].
///
/// Dropping it without calling [`complete()`](Self::complete) is observed by
/// the waiting side as a dead facility.
#[derive(Debug)]
pub struct Completion {
    sender: oneshot::Sender<Scanned>,
}
impl Completion {
    /// Create a completion together with the receiver that observes it.
    pub fn channel() -> (Self, oneshot::Receiver<Scanned>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    /// Resolves once the waiting side has gone away (for example after a
    /// timeout), at which point the outcome is no longer wanted.
    pub async fn closed(&mut self) {
        self.sender.closed().await;
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Report the outcome for `path`. Safe to call from any thread.
    pub fn complete(self, path: &Path, identifier: Option<String>) {
        let scanned = Scanned { path: path.to_path_buf(), identifier };
        if self.sender.send(scanned).is_err() {
            tracing::trace!(path = %path.display(), "Scan completed after the waiting side went away");
        }
    }
}

/// The operating system's media-indexing facility.
pub trait MediaIndexer: Send + Sync {
    /// Name of the facility (used for logging only).
    fn name(&self) -> &str;

    /// Ask the facility to index `paths`.
    ///
    /// Returning `Err` means the facility rejected the call and `completion`
    /// will never fire. Returning `Ok` means the facility owns `completion`
    /// and will fire it once, for the (single) path it was given.
    fn scan(&self, paths: &[PathBuf], completion: Completion) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("content://media/123"), true)]
    #[case(Some(""), false)]
    #[case(Some("   "), false)]
    #[case(None, false)]
    fn test_is_found(#[case] identifier: Option<&str>, #[case] expected: bool) {
        let scanned = Scanned {
            path: PathBuf::from("/tmp/real.jpg"),
            identifier: identifier.map(String::from),
        };
        assert_eq!(scanned.is_found(), expected);
    }

    #[tokio::test]
    async fn test_completion_crosses_threads() {
        let (completion, receiver) = Completion::channel();
        std::thread::spawn(move || completion.complete(Path::new("/tmp/real.jpg"), Some("content://media/123".into())));
        let scanned = receiver.await.unwrap();
        assert_eq!(scanned.path, PathBuf::from("/tmp/real.jpg"));
        assert!(scanned.is_found());
    }

    #[tokio::test]
    async fn test_dropped_completion_is_observed() {
        let (completion, receiver) = Completion::channel();
        drop(completion);
        assert!(receiver.await.is_err());
    }

    #[tokio::test]
    async fn test_closed_when_receiver_dropped() {
        let (mut completion, receiver) = Completion::channel();
        assert!(!completion.is_closed());
        drop(receiver);
        completion.closed().await;
        assert!(completion.is_closed());
    }

    #[test]
    fn test_complete_after_receiver_dropped_does_not_panic() {
        let (completion, receiver) = Completion::channel();
        drop(receiver);
        completion.complete(Path::new("/tmp/real.jpg"), None);
    }
}
