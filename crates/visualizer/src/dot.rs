//! Graphviz DOT output.

use crate::graph::{ConversationGraph, GraphNode};
use smithers_core::Role;
use std::fmt::Write;

const TITLE: &str = "Conversation Graph\n(Node size = word count)";

/// Render `graph` as a DOT digraph: top-down chain, legend and title.
pub fn to_dot(graph: &ConversationGraph) -> String {
    let mut out = String::new();
    out.push_str("digraph conversation {\n");
    let _ = writeln!(
        out,
        "  graph [rankdir=TB, label=\"{}\", labelloc=t, fontsize=14, fontname=\"Helvetica-Bold\", bgcolor=\"white\"];",
        escape(TITLE)
    );
    out.push_str(
        "  node [shape=circle, style=filled, fixedsize=true, fontsize=8, fontname=\"Helvetica-Bold\", fontcolor=\"white\", color=\"white\", penwidth=2];\n",
    );
    out.push_str("  edge [color=\"#BDC3C7\", arrowsize=0.8, penwidth=2];\n\n");

    for node in graph.nodes() {
        write_node(&mut out, node);
    }
    if !graph.edges().is_empty() {
        out.push('\n');
    }
    for edge in graph.edges() {
        let _ = writeln!(out, "  {} -> {};", edge.from, edge.to);
    }

    out.push_str("\n  subgraph cluster_legend {\n");
    out.push_str("    label=\"Legend\";\n    fontsize=10;\n    style=rounded;\n");
    for role in [Role::User, Role::Assistant, Role::System] {
        let _ = writeln!(
            out,
            "    legend_{} [label=\"{}\", shape=box, fixedsize=false, fillcolor=\"{}\", fontsize=9];",
            role.as_str(),
            capitalize(role.as_str()),
            crate::graph::role_color(role)
        );
    }
    out.push_str("  }\n}\n");
    out
}

fn write_node(out: &mut String, node: &GraphNode) {
    let _ = writeln!(
        out,
        "  {} [label=\"{}\", fillcolor=\"{}\", width={:.2}, tooltip=\"{}\"];",
        node.id,
        escape(&node.label),
        node.color,
        diameter_inches(node.size),
        escape(&node.preview)
    );
}

/// Node sizes are areas; Graphviz wants a diameter in inches.
fn diameter_inches(size: u32) -> f64 {
    f64::from(size).sqrt() / 30.0
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Escape text for a double-quoted DOT string.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}
