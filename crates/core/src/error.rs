//! Error types for the Smithers domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context (store, provider, renderer) has its own enum; the
//! top-level [`Error`] unifies them for the command-dispatch boundary.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all Smithers operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Context store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Visualization errors ---
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Malformed command arguments ---
    #[error("{0}")]
    Validation(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], as reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Transport,
    RateLimit,
    Render,
    Io,
    Config,
}

impl Error {
    /// Build a validation error from any message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Build a configuration error from any message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Store(e) => e.kind(),
            Error::Provider(ProviderError::RateLimited { .. }) => ErrorKind::RateLimit,
            Error::Provider(ProviderError::NotConfigured(_)) => ErrorKind::Config,
            Error::Provider(_) => ErrorKind::Transport,
            Error::Render(_) => ErrorKind::Render,
            Error::Config { .. } => ErrorKind::Config,
            Error::Validation(_) => ErrorKind::Validation,
        }
    }
}

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Entry {index} not found (store has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No entries in range {range} (store has {len} entries)")]
    EmptyRange { range: String, len: usize },

    #[error("Failed to access {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Invalid snapshot at {path}: {reason}")]
    Snapshot { path: PathBuf, reason: String },
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::IndexOutOfRange { .. } | StoreError::EmptyRange { .. } => {
                ErrorKind::NotFound
            }
            StoreError::Io { .. } | StoreError::Snapshot { .. } => ErrorKind::Io,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Graph renderer '{binary}' is not available. {hint}")]
    Unavailable { binary: String, hint: String },

    #[error("Unsupported output format '{0}' (use .dot, .gv, .png, .svg, .pdf or .jpg)")]
    UnsupportedFormat(String),

    #[error("No context to visualize")]
    EmptyGraph,

    #[error("Rendering failed: {0}")]
    Failed(String),

    #[error("Failed to write {path}: {reason}")]
    Io { path: PathBuf, reason: String },
}
