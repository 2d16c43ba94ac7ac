//! The context store: an ordered, exclusively owned list of entries.
//!
//! Indices are always the contiguous sequence `0..len`. Every mutation is
//! applied immediately; there is no buffering.
//!
//! Policies:
//! - ranges are clamped to the store length (see [`crate::selector`])
//! - `read` of a single out-of-range index fails, `delete` of one removes 0
//! - an empty or whitespace-only search query matches nothing

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::entry::{ContextEntry, EntryUpdate, Metadata};
use crate::error::{Error, StoreError};
use crate::message::{ChatMessage, Role};
use crate::selector::{EntryRange, Selector};
use crate::snapshot::Snapshot;

/// Ordered collection of conversation entries.
#[derive(Debug, Clone)]
pub struct ContextStore {
    entries: Vec<ContextEntry>,
    created_at: DateTime<Utc>,
}

/// Per-role entry counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub system: usize,
    pub user: usize,
    pub assistant: usize,
}

impl RoleCounts {
    pub fn get(&self, role: Role) -> usize {
        match role {
            Role::System => self.system,
            Role::User => self.user,
            Role::Assistant => self.assistant,
        }
    }

    fn bump(&mut self, role: Role) {
        match role {
            Role::System => self.system += 1,
            Role::User => self.user += 1,
            Role::Assistant => self.assistant += 1,
        }
    }
}

/// Summary statistics over the whole store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub count: usize,
    pub per_role: RoleCounts,
    pub total_words: usize,
    pub avg_words: f64,
    pub total_characters: usize,
    pub avg_characters: f64,
}

/// What a compaction did.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactionOutcome {
    /// Index of the synthetic summary entry
    pub index: usize,
    /// How many entries it replaced
    pub replaced: usize,
    /// The summary text
    pub summary: String,
}

impl ContextStore {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Build a store from a previously written snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            entries: snapshot.entries,
            created_at: snapshot.created_at,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in order.
    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&ContextEntry> {
        self.entries.get(index)
    }

    // --- CRUD ---

    /// Append a new entry and return its index.
    pub fn create(
        &mut self,
        role: Role,
        content: impl Into<String>,
        metadata: Option<Metadata>,
    ) -> usize {
        let entry = ContextEntry::new(role, content).with_metadata(metadata.unwrap_or_default());
        self.push(entry)
    }

    /// Append an already-built entry and return its index.
    pub fn push(&mut self, entry: ContextEntry) -> usize {
        let index = self.entries.len();
        debug!(index, role = %entry.role, "Entry created");
        self.entries.push(entry);
        index
    }

    /// Read the entries a selector matches, paired with their indices.
    ///
    /// A single index that does not exist is an error; ranges are clamped
    /// and role filters may match nothing.
    pub fn read(&self, selector: &Selector) -> Result<Vec<(usize, &ContextEntry)>, StoreError> {
        match selector {
            Selector::Index(index) => {
                let entry = self.entry(*index)?;
                Ok(vec![(*index, entry)])
            }
            Selector::Range(range) => {
                let span = range.clamp(self.len());
                Ok(self.entries[span.clone()]
                    .iter()
                    .enumerate()
                    .map(|(offset, entry)| (span.start + offset, entry))
                    .collect())
            }
            Selector::Role(role) => Ok(self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, entry)| entry.role == *role)
                .collect()),
        }
    }

    /// Read one entry by index.
    pub fn entry(&self, index: usize) -> Result<&ContextEntry, StoreError> {
        self.entries.get(index).ok_or(StoreError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    /// Apply a partial update to the entry at `index`.
    pub fn update(&mut self, index: usize, update: EntryUpdate) -> Result<&ContextEntry, StoreError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        update.apply(entry);
        debug!(index, "Entry updated");
        Ok(entry)
    }

    /// Remove every entry the selector matches; returns how many were removed.
    pub fn delete(&mut self, selector: &Selector) -> usize {
        let before = self.entries.len();
        match selector {
            Selector::Index(index) => {
                if *index < before {
                    self.entries.remove(*index);
                }
            }
            Selector::Range(range) => {
                self.entries.drain(range.clamp(before));
            }
            Selector::Role(role) => self.entries.retain(|entry| entry.role != *role),
        }
        let removed = before - self.entries.len();
        debug!(selector = %selector, removed, "Entries deleted");
        removed
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // --- Queries ---

    /// Case-insensitive substring search over content, in store order.
    pub fn search(&self, query: &str, limit: Option<usize>) -> Vec<(usize, &ContextEntry)> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.content.to_lowercase().contains(&needle))
            .take(limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// The whole store in completion-request shape.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.entries.iter().map(ChatMessage::from).collect()
    }

    /// The most recent `n` entries in completion-request shape.
    pub fn recent_messages(&self, n: usize) -> Vec<ChatMessage> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries[skip..].iter().map(ChatMessage::from).collect()
    }

    /// `[role]: content` lines for a range, each content cut to `max_chars`.
    pub fn preview(&self, range: &EntryRange, max_chars: usize) -> String {
        let span = range.clamp(self.len());
        if span.is_empty() {
            return "No context to compact.".to_string();
        }
        self.entries[span]
            .iter()
            .map(|entry| format!("[{}]: {}", entry.role, entry.truncated(max_chars)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn stats(&self) -> Stats {
        let mut per_role = RoleCounts::default();
        let mut total_words = 0;
        let mut total_characters = 0;

        for entry in &self.entries {
            per_role.bump(entry.role);
            total_words += entry.word_count();
            total_characters += entry.char_count();
        }

        let count = self.entries.len();
        let average = |total: usize| {
            if count == 0 {
                0.0
            } else {
                total as f64 / count as f64
            }
        };

        Stats {
            count,
            per_role,
            total_words,
            avg_words: average(total_words),
            total_characters,
            avg_characters: average(total_characters),
        }
    }

    // --- Compaction ---

    /// Replace a range with one `system` entry holding a summary.
    ///
    /// The summarizer sees the entries about to be replaced. If the clamped
    /// range is empty the summarizer is not called; if it fails the store is
    /// left untouched.
    pub fn compact<F, E>(&mut self, range: &EntryRange, summarizer: F) -> Result<CompactionOutcome, Error>
    where
        F: FnOnce(&[ContextEntry]) -> Result<String, E>,
        E: Into<Error>,
    {
        let span = range.clamp(self.len());
        if span.is_empty() {
            return Err(StoreError::EmptyRange {
                range: range.to_string(),
                len: self.len(),
            }
            .into());
        }

        let summary = summarizer(&self.entries[span.clone()]).map_err(Into::into)?;

        let mut metadata = Metadata::new();
        metadata.insert("compacted".into(), true.into());
        metadata.insert("source_start".into(), span.start.into());
        metadata.insert("source_end".into(), span.end.into());
        metadata.insert("source_count".into(), span.len().into());

        let synthetic = ContextEntry::new(Role::System, summary.clone()).with_metadata(metadata);
        let replaced = span.len();
        let index = span.start;
        self.entries.splice(span, std::iter::once(synthetic));

        info!(index, replaced, "Context compacted");
        Ok(CompactionOutcome {
            index,
            replaced,
            summary,
        })
    }

    // --- Persistence ---

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.created_at, self.entries.clone())
    }

    /// Write the full store to `path`.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        self.snapshot().write(path)
    }

    /// Replace the store's contents with the snapshot at `path`.
    ///
    /// On failure the current contents are kept.
    pub fn load(&mut self, path: &Path) -> Result<usize, StoreError> {
        let snapshot = Snapshot::read(path)?;
        *self = Self::from_snapshot(snapshot);
        info!(path = %path.display(), entries = self.len(), "Context loaded");
        Ok(self.len())
    }
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new()
    }
}
