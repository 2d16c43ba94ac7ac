//! The Smithers assistant.
//!
//! An [`Assistant`] owns a [`ChatClient`](smithers_providers::ChatClient) and
//! a [`ContextStore`](smithers_core::ContextStore). Every chat turn is sent
//! with the stored history and recorded back into it; `rag` grounds a
//! question in matching entries first, and `compact_range` asks the model to
//! summarize a span of history and replaces it with that summary.
//!
//! The [`command`] and [`session`] modules turn text lines into operations
//! on an assistant, which is what the interactive REPL drives.

pub mod assistant;
pub mod command;
pub mod prompt;
pub mod session;

#[cfg(test)]
mod test_helpers;

pub use assistant::{Assistant, RagReply};
pub use command::{Command, HELP};
pub use session::{load_config, Reply, Session};
