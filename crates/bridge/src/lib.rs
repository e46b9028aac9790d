//! Named-command dispatch across an asynchronous boundary.
//!
//! Application code hands a [`Command`] to the [`Dispatcher`] and gets back a
//! [`PendingResult`] straight away. The pending result resolves exactly once,
//! either with the handler's success value or with an [`ErrorSignal`] carrying
//! one of the boundary [`ErrorCode`]s.
//!
//! ```
//! use pulse_bridge::{Command, Dispatcher, ErrorCode};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let dispatcher = Dispatcher::new("com.pulse.app/media_scanner");
//! let resolution = dispatcher.dispatch(Command::new("unknownCommand")).await;
//! assert_eq!(resolution.unwrap_err().code, ErrorCode::Unimplemented);
//! # }
//! ```

mod command;
mod dispatch;
pub mod error;
mod pending;

pub use crate::command::{Arguments, ArgumentsExt, Command};
pub use crate::dispatch::{Dispatcher, Handler, HandlerHandle};
pub use crate::error::{ErrorCode, ErrorSignal, Resolution};
pub use crate::pending::{PendingResult, RequestId};
pub use serde_json::Value;
