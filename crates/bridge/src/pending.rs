//! Pending results.
//!
//! A [`PendingResult`] is the caller's half of an accepted command. It either
//! already holds its resolution (commands rejected during routing) or owns the
//! completion handle of the task running the handler. Awaiting it consumes the
//! resolution, so the same request can never be resolved twice.

use crate::error::Resolution;
use derive_more::Display;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use tokio::task::JoinHandle;

/// Identity linking a [`PendingResult`] to the command that created it.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("#{_0}")]
pub struct RequestId(pub(crate) u64);

enum Slot {
    Resolved(Option<Resolution>),
    Running(JoinHandle<Resolution>),
}

/// The caller's handle on an in-flight command.
///
/// Resolves exactly once. Dropping it does not cancel the handler; the
/// resolution is simply discarded.
///
/// # Panics
///
/// If the handler panicked, awaiting the pending result resumes that panic in
/// the awaiting task.
#[must_use = "a pending result does nothing unless awaited"]
pub struct PendingResult {
    id: RequestId,
    slot: Slot,
}
impl PendingResult {
    pub(crate) fn resolved(id: RequestId, resolution: Resolution) -> Self {
        Self {
            id,
            slot: Slot::Resolved(Some(resolution)),
        }
    }

    pub(crate) fn running(id: RequestId, task: JoinHandle<Resolution>) -> Self {
        Self { id, slot: Slot::Running(task) }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    /// `true` when the resolution was decided during routing, without a
    /// handler ever running.
    pub fn is_immediate(&self) -> bool {
        matches!(self.slot, Slot::Resolved(_))
    }
}
impl Future for PendingResult {
    type Output = Resolution;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let id = self.id;
        match &mut self.slot {
            Slot::Resolved(resolution) => match resolution.take() {
                Some(resolution) => Poll::Ready(resolution),
                None => panic!("pending result {id} polled after completion"),
            },
            Slot::Running(task) => match ready!(Pin::new(task).poll(cx)) {
                Ok(resolution) => Poll::Ready(resolution),
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(err) => panic!("handler for request {id} was cancelled: {err}"),
            },
        }
    }
}
impl std::fmt::Debug for PendingResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingResult")
            .field("id", &self.id)
            .field("immediate", &self.is_immediate())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorSignal;
    use serde_json::json;

    #[tokio::test]
    async fn test_resolved_yields_stored_resolution() {
        let pending = PendingResult::resolved(RequestId(7), Err(ErrorSignal::unimplemented("nope")));
        assert!(pending.is_immediate());
        assert_eq!(pending.id(), RequestId(7));
        assert_eq!(pending.await, Err(ErrorSignal::unimplemented("nope")));
    }

    #[tokio::test]
    async fn test_running_yields_task_output() {
        let pending = PendingResult::running(RequestId(1), tokio::spawn(async { Ok(json!(true)) }));
        assert!(!pending.is_immediate());
        assert_eq!(pending.await, Ok(json!(true)));
    }

    #[tokio::test]
    #[should_panic(expected = "handler exploded")]
    async fn test_running_resumes_handler_panic() {
        let task = tokio::spawn(async {
            if true {
                panic!("handler exploded");
            }
            Ok(json!(null))
        });
        let _ = PendingResult::running(RequestId(2), task).await;
    }

    #[test]
    fn test_request_id_display() {
        assert_eq!(RequestId(42).to_string(), "#42");
    }
}
