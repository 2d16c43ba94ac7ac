//! # Smithers Core
//!
//! Domain types, the context store, and error definitions for Smithers.
//! Every other crate in the workspace depends inward on this one.
//!
//! ## Layout
//!
//! - [`message`]: roles and the wire-shaped [`ChatMessage`]
//! - [`entry`]: a single [`ContextEntry`] and partial updates to it
//! - [`selector`]: parsed `index | start:end | role` selectors
//! - [`store`]: the ordered [`ContextStore`] with CRUD, search and compaction
//! - [`snapshot`]: the on-disk form written by `save` and read by `load`
//! - [`provider`]: the [`Provider`] trait every completion backend implements

pub mod entry;
pub mod error;
pub mod message;
pub mod provider;
pub mod selector;
pub mod snapshot;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use entry::{ContextEntry, EntryUpdate};
pub use error::{Error, ErrorKind, Result};
pub use message::{ChatMessage, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use selector::{EntryRange, Selector};
pub use snapshot::Snapshot;
pub use store::{CompactionOutcome, ContextStore, RoleCounts, Stats};
