//! Command dispatch for an interactive session.

use smithers_config::AppConfig;
use smithers_core::entry::truncate_chars;
use smithers_core::{ContextEntry, Error, Result, Role, Selector};
use smithers_visualizer::{visualize, GraphvizRenderer, RenderOutcome};
use std::fmt::Write;
use std::path::Path;
use tracing::debug;

use crate::assistant::Assistant;
use crate::command::{Command, HELP};

const LIST_PREVIEW_CHARS: usize = 100;

/// What the caller should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text to show the user
    Text(String),
    /// Nothing to show
    Silent,
    /// The user asked to leave
    Exit,
}

impl Reply {
    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Runs parsed commands against an [`Assistant`] and a renderer.
pub struct Session {
    assistant: Assistant,
    renderer: GraphvizRenderer,
}

impl Session {
    pub fn new(assistant: Assistant, renderer: GraphvizRenderer) -> Self {
        Self {
            assistant,
            renderer,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let assistant = Assistant::from_config(config)?;
        let renderer = GraphvizRenderer::new(&config.visualizer.graphviz_binary)
            .with_opener(config.visualizer.opener.clone());
        Ok(Self::new(assistant, renderer))
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn assistant_mut(&mut self) -> &mut Assistant {
        &mut self.assistant
    }

    /// Parse and run one line.
    pub async fn execute_line(&mut self, line: &str) -> Result<Reply> {
        let command = Command::parse(line)?;
        self.execute(command).await
    }

    /// Run one command and describe the result.
    pub async fn execute(&mut self, command: Command) -> Result<Reply> {
        debug!(command = ?command, "Executing command");

        let text = match command {
            Command::Empty => return Ok(Reply::Silent),
            Command::Exit => return Ok(Reply::Exit),
            Command::Help => HELP.to_string(),

            Command::Chat(message) => {
                let reply = self.assistant.chat(&message).await?;
                format!("Smithers: {reply}")
            }

            Command::Rag(query) => {
                let reply = self.assistant.rag(&query).await?;
                if reply.sources.is_empty() {
                    format!("Smithers (RAG): {}", reply.answer)
                } else {
                    let sources: Vec<String> = reply.sources.iter().map(usize::to_string).collect();
                    format!(
                        "Smithers (RAG): {}\n(context from entries {})",
                        reply.answer,
                        sources.join(", ")
                    )
                }
            }

            Command::Create { role, content } => {
                let index = self.assistant.store_mut().create(role, content, None);
                format!("Created entry at index {index}")
            }

            Command::Read(Selector::Index(index)) => {
                let entry = self.assistant.store().entry(index)?;
                format!("{}: {}", entry.role, entry.content)
            }

            Command::Read(selector) => {
                let entries = self.assistant.store().read(&selector)?;
                if entries.is_empty() {
                    "No entries".to_string()
                } else {
                    list(&entries)
                }
            }

            Command::Update { index, update } => {
                self.assistant.store_mut().update(index, update)?;
                format!("Updated entry {index}")
            }

            Command::Delete(selector) => {
                let removed = self.assistant.store_mut().delete(&selector);
                format!("Deleted {removed} {}", plural(removed, "entry", "entries"))
            }

            Command::Search(query) => {
                let hits = self.assistant.store().search(&query, None);
                let mut out = list(&hits);
                if !out.is_empty() {
                    out.push('\n');
                }
                let _ = write!(out, "Found {} {}", hits.len(), plural(hits.len(), "result", "results"));
                out
            }

            Command::Compact(range) => {
                let outcome = self.assistant.compact_range(&range).await?;
                format!(
                    "Compacted {} {} into entry {}. Summary:\n{}",
                    outcome.replaced,
                    plural(outcome.replaced, "entry", "entries"),
                    outcome.index,
                    outcome.summary
                )
            }

            Command::Stats => {
                let stats = self.assistant.store().stats();
                let roles = Role::ALL
                    .iter()
                    .map(|role| format!("{role}={}", stats.per_role.get(*role)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "Context Statistics:\n  \
                     Total entries: {}\n  \
                     Total words: {}\n  \
                     Average words: {:.1}\n  \
                     Total characters: {}\n  \
                     Average length: {:.1}\n  \
                     Roles: {roles}",
                    stats.count,
                    stats.total_words,
                    stats.avg_words,
                    stats.total_characters,
                    stats.avg_characters,
                )
            }

            Command::Clear => {
                self.assistant.store_mut().clear();
                "Context cleared".to_string()
            }

            Command::Save(path) => {
                self.assistant.store().save(&path)?;
                format!(
                    "Saved {} {} to {}",
                    self.assistant.store().len(),
                    plural(self.assistant.store().len(), "entry", "entries"),
                    path.display()
                )
            }

            Command::Load(path) => {
                let count = self.assistant.store_mut().load(&path)?;
                format!(
                    "Loaded {count} {} from {}",
                    plural(count, "entry", "entries"),
                    path.display()
                )
            }

            Command::Visualize { output, range } => {
                let outcome =
                    visualize(self.assistant.store(), &range, output.as_deref(), &self.renderer).await?;
                match outcome {
                    RenderOutcome::Written(path) => format!("Visualization saved to {}", path.display()),
                    RenderOutcome::Displayed(path) => {
                        format!("Visualization displayed ({})", path.display())
                    }
                }
            }
        };

        Ok(Reply::Text(text))
    }
}

/// Load the config from `path` (or the default location) with environment
/// overrides applied.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    config.map_err(|e| Error::config(e.to_string()))
}

fn list(entries: &[(usize, &ContextEntry)]) -> String {
    entries
        .iter()
        .map(|(index, entry)| {
            format!(
                "[{index}] {}: {}",
                entry.role,
                truncate_chars(&entry.content, LIST_PREVIEW_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn plural(n: usize, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 { one } else { many }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{client_for, SequentialMockProvider};
    use smithers_core::ErrorKind;

    fn session(replies: &[&str]) -> Session {
        let provider = SequentialMockProvider::new(replies);
        Session::new(
            Assistant::new(client_for(provider)),
            GraphvizRenderer::new("smithers-test-no-such-graphviz"),
        )
    }

    async fn run(session: &mut Session, line: &str) -> String {
        match session.execute_line(line).await.unwrap() {
            Reply::Text(text) => text,
            other => panic!("expected text for {line:?}, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn crud_commands_report_results() {
        let mut s = session(&[]);
        assert_eq!(run(&mut s, "create system be terse").await, "Created entry at index 0");
        assert_eq!(run(&mut s, "create user hello there").await, "Created entry at index 1");
        assert_eq!(run(&mut s, "read 1").await, "user: hello there");
        assert_eq!(
            run(&mut s, "read").await,
            "[0] system: be terse\n[1] user: hello there"
        );
        assert_eq!(run(&mut s, "update 1 content hi").await, "Updated entry 1");
        assert_eq!(run(&mut s, "read user").await, "[1] user: hi");
        assert_eq!(run(&mut s, "delete system").await, "Deleted 1 entry");
        assert_eq!(run(&mut s, "read 0").await, "user: hi");
        assert_eq!(run(&mut s, "clear").await, "Context cleared");
        assert_eq!(run(&mut s, "read").await, "No entries");
    }

    #[tokio::test]
    async fn missing_index_is_not_found() {
        let mut s = session(&[]);
        let err = s.execute_line("read 4").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = s.execute_line("update 0 role user").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn search_lists_matches_and_count() {
        let mut s = session(&[]);
        run(&mut s, "create user I like FOO").await;
        run(&mut s, "create assistant bar").await;
        run(&mut s, "create user food").await;

        assert_eq!(
            run(&mut s, "search foo").await,
            "[0] user: I like FOO\n[2] user: food\nFound 2 results"
        );
        assert_eq!(run(&mut s, "search zzz").await, "Found 0 results");
    }

    #[tokio::test]
    async fn chat_and_compact_go_through_the_assistant() {
        let mut s = session(&["4", "short summary"]);
        assert_eq!(run(&mut s, "chat 2+2?").await, "Smithers: 4");
        assert_eq!(
            run(&mut s, "compact").await,
            "Compacted 2 entries into entry 0. Summary:\nshort summary"
        );
        assert_eq!(s.assistant().store().len(), 1);
    }

    #[tokio::test]
    async fn rag_reports_sources() {
        let mut s = session(&["in vault"]);
        run(&mut s, "create user the key is in vault").await;
        assert_eq!(
            run(&mut s, "rag key").await,
            "Smithers (RAG): in vault\n(context from entries 0)"
        );
    }

    #[tokio::test]
    async fn stats_summarize_the_store() {
        let mut s = session(&[]);
        run(&mut s, "create user one two three").await;
        run(&mut s, "create assistant four").await;

        let text = run(&mut s, "stats").await;
        assert!(text.contains("Total entries: 2"));
        assert!(text.contains("Total words: 4"));
        assert!(text.contains("Average words: 2.0"));
        assert!(text.contains("user=1"));
        assert!(text.contains("assistant=1"));
        assert!(text.contains("system=0"));
    }

    #[tokio::test]
    async fn save_and_load_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.json");
        let mut s = session(&[]);
        run(&mut s, "create user remember me").await;

        let saved = run(&mut s, &format!("save {}", path.display())).await;
        assert!(saved.starts_with("Saved 1 entry to"));

        run(&mut s, "clear").await;
        let loaded = run(&mut s, &format!("load {}", path.display())).await;
        assert!(loaded.starts_with("Loaded 1 entry from"));
        assert_eq!(run(&mut s, "read 0").await, "user: remember me");
    }

    #[tokio::test]
    async fn visualize_writes_dot_without_graphviz() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.dot");
        let mut s = session(&[]);
        run(&mut s, "create user hi").await;
        run(&mut s, "create assistant hello").await;

        let text = run(&mut s, &format!("viz {}", path.display())).await;
        assert!(text.starts_with("Visualization saved to"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn visualize_image_without_graphviz_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&[]);
        run(&mut s, "create user hi").await;

        let err = s
            .execute_line(&format!("visualize {}", dir.path().join("g.png").display()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Render);
        assert_eq!(s.assistant().store().len(), 1);
    }

    #[test]
    fn unreadable_config_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_temperature = \"hot\"").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().starts_with("Configuration error:"));
    }

    #[test]
    fn unknown_provider_without_url_is_a_config_error() {
        let mut config = AppConfig::default();
        config.default_provider = "nowhere".into();
        let err = Session::from_config(&config).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[tokio::test]
    async fn control_replies() {
        let mut s = session(&[]);
        assert_eq!(s.execute_line("").await.unwrap(), Reply::Silent);
        assert_eq!(s.execute_line("quit").await.unwrap(), Reply::Exit);
        assert!(run(&mut s, "help").await.contains("compact [start:end]"));
    }
}
