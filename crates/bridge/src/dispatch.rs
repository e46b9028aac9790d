//! Command routing.
//!
//! The [`Dispatcher`] owns the handler registration table and nothing else.
//! The process owning the bridge calls [`attach()`](Dispatcher::attach) at
//! startup and [`detach()`](Dispatcher::detach) at shutdown; in between,
//! [`dispatch()`](Dispatcher::dispatch) demultiplexes commands by name.

use crate::command::{Arguments, Command};
use crate::error::{ErrorSignal, Resolution};
use crate::pending::{PendingResult, RequestId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

pub type HandlerHandle = Arc<dyn Handler + Send + Sync>;

/// A command implementation.
///
/// Handlers run on the async runtime, concurrently with each other. The
/// returned [`Resolution`] is forwarded to the caller unchanged; returning is
/// the only way to resolve, so every invocation resolves exactly once.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Name of the command this handler answers to. Registering two handlers
    /// under the same name keeps the last one.
    fn name(&self) -> &str;

    /// Run the command with its (unvalidated) arguments.
    async fn call(&self, arguments: Arguments) -> Resolution;
}

type Registry = HashMap<String, HandlerHandle>;

/// Demultiplexes incoming commands to registered handlers.
pub struct Dispatcher {
    channel: String,
    /// `None` while detached. Written only by attach/detach.
    handlers: RwLock<Option<Registry>>,
    next_id: AtomicU64,
}
impl Dispatcher {
    /// Create a detached dispatcher for the named channel. The channel name
    /// is only used for logging.
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            handlers: RwLock::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Install the handler registration table, replacing any previous one.
    pub fn attach(&self, handlers: impl IntoIterator<Item = HandlerHandle>) {
        let registry: Registry = handlers.into_iter().map(|h| (h.name().to_string(), h)).collect();
        let mut names: Vec<&str> = registry.keys().map(String::as_str).collect();
        names.sort_unstable();
        tracing::info!(channel = %self.channel, commands = ?names, "Attached command handlers");
        *self.handlers.write().unwrap_or_else(PoisonError::into_inner) = Some(registry);
    }

    /// Release the handler registration table. Commands dispatched afterwards
    /// resolve as unimplemented. Calling this while detached does nothing.
    pub fn detach(&self) {
        let previous = self.handlers.write().unwrap_or_else(PoisonError::into_inner).take();
        if previous.is_some() {
            tracing::info!(channel = %self.channel, "Detached command handlers");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    fn route(&self, name: &str) -> Option<HandlerHandle> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|registry| registry.get(name).cloned())
    }

    /// Route a command to its handler.
    ///
    /// Returns immediately. Unknown commands resolve with
    /// [`Unimplemented`](crate::ErrorCode::Unimplemented) without touching any
    /// handler; known commands run on a spawned task.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(&self, command: Command) -> PendingResult {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (name, arguments) = command.into_parts();
        let Some(handler) = self.route(&name) else {
            tracing::debug!(channel = %self.channel, request = %id, command = %name, "No handler for command");
            return PendingResult::resolved(id, Err(ErrorSignal::unimplemented(&name)));
        };
        tracing::trace!(channel = %self.channel, request = %id, command = %name, "Dispatching command");
        let task = tokio::spawn(async move {
            let resolution = handler.call(arguments).await;
            match &resolution {
                Ok(value) => tracing::debug!(request = %id, command = %name, %value, "Command resolved"),
                Err(signal) => tracing::debug!(request = %id, command = %name, %signal, "Command rejected"),
            }
            resolution
        });
        PendingResult::running(id, task)
    }
}
