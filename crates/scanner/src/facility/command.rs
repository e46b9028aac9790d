//! Indexing through an external program.
//!
//! Some hosts only expose media indexing as an executable (Termux ships
//! `termux-media-scan`, for example). The program is started synchronously so
//! that a missing or unlaunchable binary is reported as a rejected call, then
//! supervised by a task on the current runtime which fires the completion. If
//! the waiting side gives up first (a timeout), the program is killed.

use super::{Completion, MediaIndexer};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Placeholder substituted with the scanned path in configured arguments.
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Media indexer backed by an external program.
///
/// The program is expected to print the resource identifier of the indexed
/// file (a URI such as `content://media/external/images/media/123`) on
/// standard output; the last line that looks like one wins. Status chatter,
/// a non-zero exit status, or no output at all mean no identifier was
/// produced.
#[derive(Clone, Debug)]
pub struct CommandIndexer {
    program: PathBuf,
    args: Vec<String>,
}
impl CommandIndexer {
    /// Programs tried, in order, by [`discover()`](Self::discover).
    pub const CANDIDATES: [&str; 1] = ["termux-media-scan"];

    /// Use a specific program, resolved against `PATH` unless absolute.
    ///
    /// `args` are passed to the program as-is (an argument vector, no shell
    /// involved). Arguments may contain [`PATH_PLACEHOLDER`]; if none do, the
    /// path is appended after a `--` separator. Note that configuring a shell
    /// (`sh -c "... {path}"`) hands the path to that shell for interpretation.
    pub fn new(program: impl AsRef<str>, args: impl IntoIterator<Item = impl Into<String>>) -> Result<Self> {
        let program = program.as_ref();
        let resolved = which::which(program).or_raise(|| ErrorKind::IndexerNotFound(program.to_string()))?;
        Ok(Self {
            program: resolved,
            args: args.into_iter().map(Into::into).collect(),
        })
    }

    /// Find an indexing program installed on this system.
    pub fn discover() -> Result<Self> {
        for candidate in Self::CANDIDATES {
            if let Ok(program) = which::which(candidate) {
                tracing::debug!(program = %program.display(), "Discovered media indexer");
                return Ok(Self { program, args: Vec::new() });
            }
        }
        tracing::info!(candidates = ?Self::CANDIDATES, "No media indexer found in PATH");
        exn::bail!(ErrorKind::IndexerNotFound(Self::CANDIDATES.join(", ")));
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command_args(&self, path: &Path) -> Vec<OsString> {
        let has_placeholder = self.args.iter().any(|arg| arg.contains(PATH_PLACEHOLDER));
        let path = path.to_string_lossy();
        let mut args: Vec<OsString> = self
            .args
            .iter()
            .map(|arg| OsString::from(arg.replace(PATH_PLACEHOLDER, &path)))
            .collect();
        if !has_placeholder {
            args.push(OsString::from("--"));
            args.push(OsString::from(path.as_ref()));
        }
        args
    }
}

/// `scheme:rest` with an RFC 3986 scheme of at least two characters (so that
/// `C:\...` is not mistaken for one) and no whitespace.
fn is_resource_uri(line: &str) -> bool {
    let Some((scheme, rest)) = line.split_once(':') else {
        return false;
    };
    scheme.len() > 1
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.is_empty()
        && !line.contains(char::is_whitespace)
}

fn identifier_from(stdout: &[u8]) -> Option<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::trim)
        .filter(|line| is_resource_uri(line))
        .last()
        .map(String::from)
}

impl MediaIndexer for CommandIndexer {
    fn name(&self) -> &str {
        self.program.file_name().and_then(|name| name.to_str()).unwrap_or("command")
    }

    /// # Errors
    ///
    /// Besides spawn failures, the call is rejected when made outside a Tokio
    /// runtime: the program is never started without something to reap it.
    fn scan(&self, paths: &[PathBuf], mut completion: Completion) -> Result<()> {
        let [path] = paths else {
            exn::bail!(ErrorKind::Rejected(format!("expected exactly one path, got {}", paths.len())));
        };
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ErrorKind::Rejected(format!("no runtime to supervise the indexer: {e}")))?;
        let child = Command::new(&self.program)
            .args(self.command_args(path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(ErrorKind::Io)?;
        tracing::trace!(program = %self.program.display(), path = %path.display(), pid = ?child.id(), "Started media indexer");

        let path = path.clone();
        runtime.spawn(async move {
            let output = tokio::select! {
                output = child.wait_with_output() => output,
                () = completion.closed() => {
                    // Dropping the child kills it.
                    tracing::debug!(path = %path.display(), "Stopping media indexer nobody is waiting on");
                    return;
                },
            };
            let identifier = match output {
                Ok(output) if output.status.success() => identifier_from(&output.stdout),
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    tracing::warn!(path = %path.display(), status = %output.status, stderr = %stderr.trim(), "Media indexer exited unsuccessfully");
                    None
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Lost track of media indexer process");
                    None
                },
            };
            completion.complete(&path, identifier);
        });
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::invoker::{ScanFile, ScanOutcome};
    use crate::probe::LocalProbe;
    use pulse_bridge::ErrorCode;
    use rstest::rstest;
    use std::sync::Arc;
    use std::time::Duration;

    fn indexer(args: &[&str]) -> CommandIndexer {
        CommandIndexer::new("sh", args.iter().copied()).unwrap()
    }

    async fn scan(indexer: &CommandIndexer, path: &str) -> Option<String> {
        let (completion, receiver) = Completion::channel();
        indexer.scan(&[PathBuf::from(path)], completion).unwrap();
        receiver.await.unwrap().identifier
    }

    #[test]
    fn test_placeholder_substituted() {
        let indexer = indexer(&["-c", "echo content://media/{path}"]);
        let args = indexer.command_args(Path::new("/tmp/real.jpg"));
        assert_eq!(args, vec![OsString::from("-c"), OsString::from("echo content://media//tmp/real.jpg")]);
    }

    #[rstest]
    #[case("/tmp/real.jpg")]
    #[case("-rf.jpg")]
    fn test_path_appended_after_separator(#[case] path: &str) {
        let indexer = CommandIndexer::new("sh", Vec::<String>::new()).unwrap();
        let args = indexer.command_args(Path::new(path));
        assert_eq!(args, vec![OsString::from("--"), OsString::from(path)]);
    }

    #[rstest]
    #[case(b"Scanning...\ncontent://media/123\n\n".as_slice(), Some("content://media/123"))]
    #[case(b"content://media/1\ncontent://media/2\n".as_slice(), Some("content://media/2"))]
    #[case(b"content://media/123\nFinished scanning 1 file(s)\n".as_slice(), Some("content://media/123"))]
    #[case(b"Finished scanning 0 file(s)\n".as_slice(), None)]
    #[case(b"Error: media storage unmounted\n".as_slice(), None)]
    #[case(b"C:\\sdcard\\real.jpg\n".as_slice(), None)]
    #[case(b"content:\n".as_slice(), None)]
    #[case(b"  \n".as_slice(), None)]
    #[case(b"".as_slice(), None)]
    fn test_identifier_from(#[case] stdout: &[u8], #[case] expected: Option<&str>) {
        assert_eq!(identifier_from(stdout).as_deref(), expected);
    }

    #[test]
    fn test_unknown_program() {
        let err = CommandIndexer::new("definitely-not-a-media-indexer-binary", Vec::<String>::new()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::IndexerNotFound(name) if name == "definitely-not-a-media-indexer-binary"));
    }

    #[tokio::test]
    async fn test_identifier_from_stdout() {
        let indexer = indexer(&["-c", "printf 'Scanning {path}\\ncontent://media/123\\n'"]);
        assert_eq!(scan(&indexer, "/tmp/real.jpg").await, Some("content://media/123".to_string()));
    }

    #[tokio::test]
    async fn test_failed_exit_has_no_identifier() {
        let indexer = indexer(&["-c", "echo content://media/123; exit 3"]);
        assert_eq!(scan(&indexer, "/tmp/real.jpg").await, None);
    }

    #[tokio::test]
    async fn test_silent_success_has_no_identifier() {
        let indexer = indexer(&["-c", "true"]);
        assert_eq!(scan(&indexer, "/tmp/real.jpg").await, None);
    }

    #[tokio::test]
    async fn test_status_only_output_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("real.jpg");
        std::fs::write(&file, b"\xFF\xD8\xFF").unwrap();
        let indexer = indexer(&["-c", "echo 'Finished scanning 0 file(s)'"]);
        let handler = ScanFile::new(Arc::new(indexer), Arc::new(LocalProbe));
        let outcome = handler.scan_file(file.to_str().unwrap()).await;
        assert_eq!(outcome, Ok(ScanOutcome { found: false }));
    }

    #[tokio::test]
    async fn test_timed_out_scan_stops_indexer() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("real.jpg");
        std::fs::write(&file, b"\xFF\xD8\xFF").unwrap();
        let marker = dir.path().join("indexer-finished");
        let script = format!("sleep 1; touch '{}'", marker.display());
        let indexer = indexer(&["-c", &script]);
        let handler =
            ScanFile::new(Arc::new(indexer), Arc::new(LocalProbe)).with_timeout(Some(Duration::from_millis(50)));

        let err = handler.scan_file(file.to_str().unwrap()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ScanError);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "indexer kept running after the scan timed out");
    }

    #[tokio::test]
    async fn test_spawn_failure_is_synchronous() {
        let indexer = CommandIndexer {
            program: PathBuf::from("/nonexistent/media-indexer"),
            args: Vec::new(),
        };
        let (completion, _receiver) = Completion::channel();
        let err = indexer.scan(&[PathBuf::from("/tmp/real.jpg")], completion).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Io(_)));
    }

    #[test]
    fn test_outside_runtime_never_starts_program() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("indexer-started");
        let script = format!("touch '{}'", marker.display());
        let indexer = indexer(&["-c", &script]);
        let (completion, _receiver) = Completion::channel();
        let err = indexer.scan(&[PathBuf::from("/tmp/real.jpg")], completion).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Rejected(_)));
        std::thread::sleep(Duration::from_millis(200));
        assert!(!marker.exists());
    }

    #[test]
    fn test_rejects_multiple_paths() {
        let indexer = indexer(&["-c", "true"]);
        let (completion, _receiver) = Completion::channel();
        let paths = [PathBuf::from("/tmp/a.jpg"), PathBuf::from("/tmp/b.jpg")];
        let err = indexer.scan(&paths, completion).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Rejected(_)));
    }
}
