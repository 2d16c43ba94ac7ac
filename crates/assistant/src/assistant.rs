//! The assistant: chat turns recorded into an owned context store.

use serde_json::Value;
use smithers_config::{AppConfig, AssistantConfig};
use smithers_core::entry::Metadata;
use smithers_core::error::{ProviderError, StoreError};
use smithers_core::{
    ChatMessage, CompactionOutcome, ContextStore, EntryRange, Error, Result, Role,
};
use smithers_providers::{build_chat_client, ChatClient};
use tracing::{debug, info};

use crate::prompt;

/// Answer to a retrieval-augmented question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RagReply {
    pub answer: String,
    /// Indices of the entries folded into the prompt
    pub sources: Vec<usize>,
}

/// Chat assistant that keeps its conversation in a [`ContextStore`].
pub struct Assistant {
    client: ChatClient,
    store: ContextStore,
    settings: AssistantConfig,
}

impl Assistant {
    /// Create an assistant with an empty store and default settings.
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            store: ContextStore::new(),
            settings: AssistantConfig::default(),
        }
    }

    /// Build the client and settings from `config`.
    pub fn from_config(config: &AppConfig) -> std::result::Result<Self, ProviderError> {
        let client = build_chat_client(config)?;
        Ok(Self::new(client).with_settings(config.assistant.clone()))
    }

    pub fn with_settings(mut self, settings: AssistantConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_store(mut self, store: ContextStore) -> Self {
        self.store = store;
        self
    }

    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    pub fn settings(&self) -> &AssistantConfig {
        &self.settings
    }

    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ContextStore {
        &mut self.store
    }

    /// Send `message` with the history window and record both sides.
    ///
    /// Nothing is recorded when the completion fails.
    pub async fn chat(&mut self, message: &str) -> Result<String> {
        let message = non_empty(message, "Message")?;
        self.exchange(message.to_string(), message, None).await
    }

    /// One-off question: no history is sent and nothing is recorded.
    pub async fn ask(&self, message: &str) -> Result<String> {
        let message = non_empty(message, "Message")?;
        Ok(self.client.ask(message).await?)
    }

    /// Ground `query` in matching entries, then chat.
    ///
    /// Matching happens before anything is recorded, so the new question
    /// never retrieves itself. The stored user entry is the raw query.
    pub async fn rag(&mut self, query: &str) -> Result<RagReply> {
        let query = non_empty(query, "Query")?;
        let matches = self.store.search(query, Some(self.settings.rag_limit));

        if matches.is_empty() {
            debug!("No stored context matched, sending as plain chat");
            let answer = self.exchange(query.to_string(), query, None).await?;
            return Ok(RagReply {
                answer,
                sources: Vec::new(),
            });
        }

        let sources: Vec<usize> = matches.iter().map(|(i, _)| *i).collect();
        let outgoing = prompt::rag_prompt(query, &matches, self.settings.rag_snippet_chars);
        debug!(sources = ?sources, "Retrieved context for question");

        let mut metadata = Metadata::new();
        metadata.insert(
            "rag_sources".into(),
            Value::Array(sources.iter().map(|i| Value::from(*i)).collect()),
        );

        let answer = self.exchange(outgoing, query, Some(metadata)).await?;
        Ok(RagReply { answer, sources })
    }

    /// Summarize `range` with the model and replace it with the summary.
    ///
    /// An empty range fails before any request is made; a failed request
    /// leaves the store untouched.
    ///
    /// The model call is awaited here, outside `ContextStore::compact`,
    /// because its summarizer closure is synchronous; the closure only hands
    /// over the finished summary.
    pub async fn compact_range(&mut self, range: &EntryRange) -> Result<CompactionOutcome> {
        if range.clamp(self.store.len()).is_empty() {
            return Err(StoreError::EmptyRange {
                range: range.to_string(),
                len: self.store.len(),
            }
            .into());
        }

        let preview = self.store.preview(range, self.settings.compact_preview_chars);
        let summary = self.client.ask(prompt::compaction_prompt(&preview)).await?;
        self.store.compact(range, |_| Ok::<_, Error>(summary))
    }

    fn history(&self) -> Vec<ChatMessage> {
        match self.settings.history_window {
            Some(n) => self.store.recent_messages(n),
            None => self.store.messages(),
        }
    }

    async fn exchange(
        &mut self,
        outgoing: String,
        stored: &str,
        metadata: Option<Metadata>,
    ) -> Result<String> {
        let mut messages = self.history();
        let history_len = messages.len();
        messages.push(ChatMessage::user(outgoing));

        let reply = self.client.complete(messages).await?;

        self.store.create(Role::User, stored, metadata);
        self.store.create(Role::Assistant, reply.clone(), None);
        info!(
            history = history_len,
            entries = self.store.len(),
            "Chat turn recorded"
        );
        Ok(reply)
    }
}

fn non_empty<'a>(text: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(Error::validation(format!("{what} cannot be empty")))
    } else {
        Ok(trimmed)
    }
}
