//! Maps tokenized command lines to handlers.
//!
//! Routes are tried in registration order. Action routes resolve through an
//! [`ActionRegistry`] and receive the captured bindings; inline routes only
//! receive the command.

mod actions;
mod command;
mod dispatch;
mod pattern;

pub use actions::{Action, ActionRegistry, ActionTable};
pub use command::{Argv, Command};
pub use dispatch::{InlineHandler, Route, Router, RoutingError, Target};
pub use pattern::{Bindings, Pattern, Segment, DEFAULT_CAPTURE_MARKER};
