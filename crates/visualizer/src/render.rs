//! Rendering through the Graphviz `dot` binary.

use crate::dot::to_dot;
use crate::graph::ConversationGraph;
use smithers_core::error::RenderError;
use smithers_core::{ContextStore, EntryRange};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

const INSTALL_HINT: &str =
    "Install Graphviz (https://graphviz.org/download/) or write a .dot file instead.";

/// Output format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Dot,
    Png,
    Svg,
    Pdf,
    Jpg,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "dot" | "gv" => Ok(Self::Dot),
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            _ => Err(RenderError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Argument for `dot -T`, `None` when no rendering is needed.
    fn graphviz_type(self) -> Option<&'static str> {
        match self {
            Self::Dot => None,
            Self::Png => Some("png"),
            Self::Svg => Some("svg"),
            Self::Pdf => Some("pdf"),
            Self::Jpg => Some("jpg"),
        }
    }
}

/// What `visualize` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Graph written to the requested path
    Written(PathBuf),
    /// Graph rendered to a temporary file and handed to the system viewer
    Displayed(PathBuf),
}

/// Drives the `dot` binary and the system viewer.
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    binary: String,
    opener: Option<String>,
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl GraphvizRenderer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            opener: None,
        }
    }

    /// Use `opener` instead of the platform viewer for interactive display.
    pub fn with_opener(mut self, opener: Option<String>) -> Self {
        self.opener = opener;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Probe the renderer with `dot -V`.
    pub async fn is_available(&self) -> bool {
        let status = Command::new(&self.binary)
            .arg("-V")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) => status.success(),
            Err(e) => {
                debug!(binary = %self.binary, error = %e, "Graphviz version check failed");
                false
            }
        }
    }

    async fn ensure_available(&self) -> Result<(), RenderError> {
        if self.is_available().await {
            Ok(())
        } else {
            Err(RenderError::Unavailable {
                binary: self.binary.clone(),
                hint: INSTALL_HINT.into(),
            })
        }
    }

    /// Write `graph` to `path` in the format named by its extension.
    pub async fn render_to_file(&self, graph: &ConversationGraph, path: &Path) -> Result<(), RenderError> {
        if graph.is_empty() {
            return Err(RenderError::EmptyGraph);
        }
        let format = OutputFormat::from_path(path)?;
        let dot = to_dot(graph);

        match format.graphviz_type() {
            None => write_dot(path, &dot).await,
            Some(kind) => {
                self.ensure_available().await?;
                create_parent(path).await?;
                self.run_dot(kind, path, &dot).await
            }
        }
    }

    /// Render `graph` to a temporary SVG and open it in the system viewer.
    pub async fn display(&self, graph: &ConversationGraph) -> Result<PathBuf, RenderError> {
        if graph.is_empty() {
            return Err(RenderError::EmptyGraph);
        }
        self.ensure_available().await?;

        let path = std::env::temp_dir().join(format!("smithers-graph-{}.svg", uuid::Uuid::new_v4()));
        self.run_dot("svg", &path, &to_dot(graph)).await?;
        self.open(&path).await?;
        Ok(path)
    }

    async fn run_dot(&self, kind: &str, path: &Path, dot: &str) -> Result<(), RenderError> {
        debug!(binary = %self.binary, kind, path = %path.display(), "Running Graphviz");

        let mut child = Command::new(&self.binary)
            .arg(format!("-T{kind}"))
            .arg("-o")
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RenderError::Unavailable {
                binary: self.binary.clone(),
                hint: format!("{e}. {INSTALL_HINT}"),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(dot.as_bytes())
                .await
                .map_err(|e| RenderError::Failed(format!("writing graph to {}: {e}", self.binary)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| RenderError::Failed(e.to_string()))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(RenderError::Failed(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )))
        }
    }

    async fn open(&self, path: &Path) -> Result<(), RenderError> {
        let mut command = match &self.opener {
            Some(opener) => Command::new(opener),
            None => platform_opener(),
        };
        command.arg(path).stdout(Stdio::null()).stderr(Stdio::null());

        match command.status().await {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => {
                warn!(%status, path = %path.display(), "Viewer exited with an error");
                Err(RenderError::Failed(format!(
                    "viewer exited with {status}; graph saved at {}",
                    path.display()
                )))
            }
            Err(e) => Err(RenderError::Unavailable {
                binary: "viewer".into(),
                hint: format!("{e}. Graph saved at {}", path.display()),
            }),
        }
    }
}

#[cfg(target_os = "macos")]
fn platform_opener() -> Command {
    Command::new("open")
}

#[cfg(target_os = "windows")]
fn platform_opener() -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn platform_opener() -> Command {
    Command::new("xdg-open")
}

async fn create_parent(path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RenderError::Io {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
    }
    Ok(())
}

async fn write_dot(path: &Path, dot: &str) -> Result<(), RenderError> {
    create_parent(path).await?;
    tokio::fs::write(path, dot).await.map_err(|e| RenderError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Visualize `range` of `store`: write to `output` when given, otherwise
/// display interactively.
pub async fn visualize(
    store: &ContextStore,
    range: &EntryRange,
    output: Option<&Path>,
    renderer: &GraphvizRenderer,
) -> Result<RenderOutcome, RenderError> {
    let graph = ConversationGraph::from_store(store, range);
    match output {
        Some(path) => {
            renderer.render_to_file(&graph, path).await?;
            info!(path = %path.display(), nodes = graph.nodes().len(), "Graph written");
            Ok(RenderOutcome::Written(path.to_path_buf()))
        }
        None => {
            let path = renderer.display(&graph).await?;
            info!(path = %path.display(), nodes = graph.nodes().len(), "Graph displayed");
            Ok(RenderOutcome::Displayed(path))
        }
    }
}
