//! Conversation graph visualizer for Smithers.
//!
//! Turns a range of a [`smithers_core::ContextStore`] into a linear graph,
//! one node per entry and one edge per consecutive pair, styled by role and
//! word count, and renders it through Graphviz.
//!
//! Graphviz is an optional runtime dependency: DOT output never needs it,
//! image output checks for it first and reports `RenderError::Unavailable`
//! instead of failing hard.

pub mod dot;
pub mod graph;
pub mod render;

pub use dot::to_dot;
pub use graph::{ConversationGraph, GraphEdge, GraphNode};
pub use render::{visualize, GraphvizRenderer, OutputFormat, RenderOutcome};
