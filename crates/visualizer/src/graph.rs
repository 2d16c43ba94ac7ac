//! Graph model built from a store snapshot.

use smithers_core::entry::truncate_chars;
use smithers_core::{ContextStore, EntryRange, Role};

/// Smallest node size, used for empty entries.
pub const MIN_NODE_SIZE: u32 = 100;
/// Largest node size, reached at 300 words.
pub const MAX_NODE_SIZE: u32 = 3000;

const PREVIEW_CHARS: usize = 100;

/// One entry as a node.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    /// Index of the entry in the store
    pub index: usize,
    pub role: Role,
    pub word_count: usize,
    pub size: u32,
    pub color: &'static str,
    /// Short label, e.g. `U\n12w`
    pub label: String,
    /// First characters of the content
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

/// A linear chain of entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl ConversationGraph {
    /// Build the graph for `range` (clamped to the store).
    pub fn from_store(store: &ContextStore, range: &EntryRange) -> Self {
        let span = range.clamp(store.len());
        let mut graph = Self::default();

        for (index, entry) in store.entries()[span.clone()]
            .iter()
            .enumerate()
            .map(|(offset, entry)| (span.start + offset, entry))
        {
            let word_count = entry.word_count();
            let node = GraphNode {
                id: format!("node_{index}"),
                index,
                role: entry.role,
                word_count,
                size: normalize_size(word_count),
                color: role_color(entry.role),
                label: format!("{}\n{}w", entry.role.initial(), word_count),
                preview: truncate_chars(&entry.content, PREVIEW_CHARS),
            };

            if let Some(prev) = graph.nodes.last() {
                graph.edges.push(GraphEdge {
                    from: prev.id.clone(),
                    to: node.id.clone(),
                });
            }
            graph.nodes.push(node);
        }

        graph
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Map a word count to a node size: ten units per word within bounds.
pub fn normalize_size(word_count: usize) -> u32 {
    if word_count == 0 {
        return MIN_NODE_SIZE;
    }
    let scaled = u32::try_from(word_count.saturating_mul(10)).unwrap_or(u32::MAX);
    scaled.clamp(MIN_NODE_SIZE, MAX_NODE_SIZE)
}

pub fn role_color(role: Role) -> &'static str {
    match role {
        Role::User => "#4A90E2",
        Role::Assistant => "#50C878",
        Role::System => "#FF6B6B",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> ContextStore {
        let mut store = ContextStore::new();
        store.create(Role::System, "be brief", None);
        store.create(Role::User, "what is the capital of france", None);
        store.create(Role::Assistant, "Paris", None);
        store.create(Role::User, "", None);
        store
    }

    #[test]
    fn one_node_per_entry_chained_in_order() {
        let graph = ConversationGraph::from_store(&sample_store(), &EntryRange::full());
        assert_eq!(graph.nodes().len(), 4);
        assert_eq!(graph.edges().len(), 3);
        assert_eq!(
            graph.edges()[0],
            GraphEdge {
                from: "node_0".into(),
                to: "node_1".into()
            }
        );
        assert_eq!(graph.edges()[2].to, "node_3");
    }

    #[test]
    fn subrange_keeps_store_indices() {
        let graph = ConversationGraph::from_store(&sample_store(), &EntryRange::new(1, 3));
        let ids: Vec<_> = graph.nodes().iter().map(|n| n.index).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn nodes_carry_role_styling_and_labels() {
        let graph = ConversationGraph::from_store(&sample_store(), &EntryRange::full());
        let user = &graph.nodes()[1];
        assert_eq!(user.color, "#4A90E2");
        assert_eq!(user.word_count, 6);
        assert_eq!(user.label, "U\n6w");
        assert_eq!(graph.nodes()[0].color, "#FF6B6B");
        assert_eq!(graph.nodes()[2].color, "#50C878");
    }

    #[test]
    fn size_scales_with_words_within_bounds() {
        assert_eq!(normalize_size(0), MIN_NODE_SIZE);
        assert_eq!(normalize_size(3), MIN_NODE_SIZE);
        assert_eq!(normalize_size(42), 420);
        assert_eq!(normalize_size(10_000), MAX_NODE_SIZE);
    }

    #[test]
    fn empty_range_gives_empty_graph() {
        let graph = ConversationGraph::from_store(&sample_store(), &EntryRange::new(10, 12));
        assert!(graph.is_empty());
        assert!(graph.edges().is_empty());
    }
}
