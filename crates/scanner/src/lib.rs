//! The `scanFile` command.
//!
//! Asks the operating system's media-indexing facility to catalog a single
//! file that already exists on disk, and reports whether the facility handed
//! back a resource identifier for it. The facility and the filesystem are both
//! reached through traits ([`MediaIndexer`], [`FileProbe`]) so that hosts can
//! plug in whatever their platform offers and tests can plug in mocks.

pub mod error;
pub mod facility;
mod invoker;
pub mod probe;

pub use crate::facility::{Completion, IndexerHandle, MediaIndexer, Scanned};
pub use crate::invoker::{ScanFile, ScanOutcome};
pub use crate::probe::{FileProbe, LocalProbe, ProbeHandle};
