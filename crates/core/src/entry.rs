//! Context entries: the unit of conversation state held by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{ChatMessage, Role};

/// Free-form per-entry metadata.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// One role-tagged piece of conversation content.
///
/// An entry has no id of its own; its identity is its position in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    /// Who produced this entry
    pub role: Role,

    /// The text content
    pub content: String,

    /// Creation time. Snapshots written by older tools may lack it.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,

    /// Arbitrary metadata (RAG sources, compaction provenance, user notes)
    #[serde(default)]
    pub metadata: Metadata,
}

impl ContextEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Whitespace-separated word count of the content.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Character (not byte) count of the content.
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Content cut to at most `max_chars` characters, with "..." when cut.
    pub fn truncated(&self, max_chars: usize) -> String {
        truncate_chars(&self.content, max_chars)
    }

    pub fn to_message(&self) -> ChatMessage {
        ChatMessage::new(self.role, self.content.clone())
    }
}

impl From<&ContextEntry> for ChatMessage {
    fn from(entry: &ContextEntry) -> Self {
        entry.to_message()
    }
}

/// A partial update applied by `ContextStore::update`.
///
/// `role` and `content` replace the current values; `metadata` keys are
/// merged into the existing map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryUpdate {
    pub role: Option<Role>,
    pub content: Option<String>,
    pub metadata: Option<Metadata>,
}

impl EntryUpdate {
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn metadata(metadata: Metadata) -> Self {
        Self {
            metadata: Some(metadata),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.content.is_none() && self.metadata.is_none()
    }

    pub(crate) fn apply(self, entry: &mut ContextEntry) {
        if let Some(role) = self.role {
            entry.role = role;
        }
        if let Some(content) = self.content {
            entry.content = content;
        }
        if let Some(metadata) = self.metadata {
            entry.metadata.extend(metadata);
        }
    }
}

/// Cut `text` to `max_chars` characters, appending "..." when anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_splits_on_any_whitespace() {
        let entry = ContextEntry::new(Role::User, "  one two\tthree\nfour ");
        assert_eq!(entry.word_count(), 4);
        assert_eq!(ContextEntry::new(Role::User, "").word_count(), 0);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("exact", 5), "exact");
    }

    #[test]
    fn update_merges_metadata() {
        let mut meta = Metadata::new();
        meta.insert("a".into(), 1.into());
        meta.insert("b".into(), 2.into());
        let mut entry = ContextEntry::new(Role::User, "hi").with_metadata(meta);

        let mut patch = Metadata::new();
        patch.insert("b".into(), 20.into());
        patch.insert("c".into(), 3.into());
        EntryUpdate::metadata(patch).apply(&mut entry);

        assert_eq!(entry.metadata["a"], 1);
        assert_eq!(entry.metadata["b"], 20);
        assert_eq!(entry.metadata["c"], 3);
    }

    #[test]
    fn legacy_entry_without_timestamp_deserializes() {
        let entry: ContextEntry =
            serde_json::from_str(r#"{"role":"user","content":"hello"}"#).unwrap();
        assert_eq!(entry.role, Role::User);
        assert!(entry.metadata.is_empty());
    }
}
