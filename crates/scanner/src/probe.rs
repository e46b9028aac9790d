//! Filesystem existence probes.

use std::path::Path;
use std::sync::Arc;

pub type ProbeHandle = Arc<dyn FileProbe + Send + Sync>;

/// Synchronous check of whether a path currently exists.
pub trait FileProbe: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
}

/// Probe backed by the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalProbe;

impl FileProbe for LocalProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockProbe;

#[cfg(any(test, feature = "mock"))]
mod mock {
    use super::FileProbe;
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Probe answering from a fixed set of paths, counting every check.
    #[derive(Debug, Default)]
    pub struct MockProbe {
        files: HashSet<PathBuf>,
        probes: AtomicUsize,
    }

    impl MockProbe {
        pub fn with_files(files: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
            Self {
                files: files.into_iter().map(Into::into).collect(),
                probes: AtomicUsize::new(0),
            }
        }

        /// Number of existence checks performed so far.
        pub fn probe_count(&self) -> usize {
            self.probes.load(Ordering::SeqCst)
        }
    }

    impl FileProbe for MockProbe {
        fn exists(&self, path: &Path) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.files.contains(path)
        }
    }
}
