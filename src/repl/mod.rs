//! Interactive prompt for completing query filters
//!
//! This module provides:
//! - Line editing with reedline and persistent history
//! - Tab completion of filters against the sampled schema of the selected
//!   collection
//! - Commands to pick a collection, inspect its schema and resample it
//! - A prompt showing the current namespace

mod command;
mod completer;
mod engine;
mod prompt;
mod session;
mod shared_state;

#[cfg(test)]
mod tests;

pub use command::{HELP, ReplCommand};
pub use completer::{QueryCompleter, edit_span};
pub use engine::ReplEngine;
pub use prompt::NamespacePrompt;
pub use session::ReplSession;
pub use shared_state::SharedState;
