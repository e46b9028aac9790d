//! In-memory media indexer for testing.

use super::{Completion, MediaIndexer};
use crate::error::{ErrorKind, Result};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// How a [`MockIndexer`] answers a scan request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockReply {
    /// Fire the completion with this identifier (from another thread).
    Identifier(String),
    /// Fire the completion without an identifier (from another thread).
    NoIdentifier,
    /// Reject the call synchronously with this description.
    Fault(String),
    /// Accept the call, then drop the completion without firing it.
    Drop,
    /// Accept the call and hold on to the completion forever.
    Never,
}

type Responder = Box<dyn Fn(&Path) -> MockReply + Send + Sync>;

/// Media indexer that answers from a closure instead of the operating system.
///
/// Completions are fired from freshly spawned threads, the same way a real
/// facility calls back from a thread it owns. Every requested path is
/// recorded so tests can assert whether (and how often) the facility was
/// reached.
pub struct MockIndexer {
    responder: Responder,
    calls: Mutex<Vec<PathBuf>>,
    held: Mutex<Vec<Completion>>,
}

impl MockIndexer {
    /// Answer every request the same way.
    pub fn replying(reply: MockReply) -> Self {
        Self::with(move |_| reply.clone())
    }

    /// Answer each request based on its path.
    pub fn with(responder: impl Fn(&Path) -> MockReply + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
            held: Mutex::new(Vec::new()),
        }
    }

    /// Paths requested so far, in call order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl MediaIndexer for MockIndexer {
    fn name(&self) -> &str {
        "mock"
    }

    fn scan(&self, paths: &[PathBuf], completion: Completion) -> Result<()> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).extend_from_slice(paths);
        let [path] = paths else {
            exn::bail!(ErrorKind::Rejected(format!("expected exactly one path, got {}", paths.len())));
        };
        let path = path.clone();
        match (self.responder)(&path) {
            MockReply::Identifier(id) => {
                std::thread::spawn(move || completion.complete(&path, Some(id)));
            },
            MockReply::NoIdentifier => {
                std::thread::spawn(move || completion.complete(&path, None));
            },
            MockReply::Fault(description) => exn::bail!(ErrorKind::Rejected(description)),
            MockReply::Drop => {
                std::thread::spawn(move || drop(completion));
            },
            MockReply::Never => self.held.lock().unwrap_or_else(PoisonError::into_inner).push(completion),
        }
        Ok(())
    }
}
