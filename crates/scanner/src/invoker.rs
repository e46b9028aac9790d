use crate::facility::{Completion, IndexerHandle};
use crate::probe::ProbeHandle;
use async_trait::async_trait;
use pulse_bridge::{Arguments, ArgumentsExt, ErrorSignal, Handler, Resolution, Value};
use std::path::PathBuf;
use std::time::Duration;
use tracing::instrument;

/// Whether the indexing facility produced a resource identifier.
///
/// A negative outcome is not an error: the facility was reached and simply
/// declined (or failed) to hand back a reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanOutcome {
    pub found: bool,
}
impl From<ScanOutcome> for Value {
    fn from(outcome: ScanOutcome) -> Self {
        Value::Bool(outcome.found)
    }
}

/// Handler for the `scanFile` command.
///
/// Each invocation moves through validation (argument, then file existence)
/// before a single request is made to the indexing facility. Invocations share
/// nothing but the two handles, so any number may be in flight at once.
#[derive(Clone)]
pub struct ScanFile {
    indexer: IndexerHandle,
    probe: ProbeHandle,
    timeout: Option<Duration>,
}
impl ScanFile {
    pub const COMMAND: &'static str = "scanFile";

    pub fn new(indexer: IndexerHandle, probe: ProbeHandle) -> Self {
        Self { indexer, probe, timeout: None }
    }

    /// Give up waiting on the facility after `timeout`, resolving with
    /// `SCAN_ERROR`. Without this, a facility that never calls back leaves the
    /// invocation pending forever.
    ///
    /// On expiry the completion's receiver is dropped. Facilities that watch
    /// [`Completion::closed`] (such as
    /// [`CommandIndexer`](crate::facility::CommandIndexer)) stop their work;
    /// others run to completion and their outcome is discarded.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Index the file at `path`.
    #[instrument(level = "debug", skip(self), fields(indexer = self.indexer.name()))]
    pub async fn scan_file(&self, path: &str) -> Result<ScanOutcome, ErrorSignal> {
        let path = PathBuf::from(path);
        if !self.probe.exists(&path) {
            return Err(ErrorSignal::file_not_found(format!("File does not exist: {}", path.display())));
        }

        let (completion, receiver) = Completion::channel();
        if let Err(err) = self.indexer.scan(std::slice::from_ref(&path), completion) {
            tracing::error!(path = %path.display(), error = ?err, "Error scanning file");
            return Err(ErrorSignal::scan_error(format!("Error scanning file: {}", *err)));
        }

        let completed = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, receiver).await {
                Ok(completed) => completed,
                Err(_) => {
                    tracing::error!(path = %path.display(), ?timeout, "Timed out waiting for media indexer");
                    return Err(ErrorSignal::scan_error(format!(
                        "Error scanning file: timed out after {timeout:?}: {}",
                        path.display()
                    )));
                },
            },
            None => receiver.await,
        };
        let Ok(scanned) = completed else {
            tracing::error!(path = %path.display(), "Media indexer dropped its completion");
            return Err(ErrorSignal::scan_error(format!(
                "Error scanning file: indexer never reported back: {}",
                path.display()
            )));
        };

        tracing::debug!(path = %path.display(), identifier = ?scanned.identifier, "Scanned file");
        Ok(ScanOutcome { found: scanned.is_found() })
    }
}

#[async_trait]
impl Handler for ScanFile {
    fn name(&self) -> &str {
        Self::COMMAND
    }

    async fn call(&self, arguments: Arguments) -> Resolution {
        let path = arguments.required_str("path")?;
        self.scan_file(path).await.map(Value::from)
    }
}
