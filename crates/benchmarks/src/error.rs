//! Benchmark errors.
//!
//! Only plan and output problems are errors; a failed model call is part of
//! the measurement and lands in the report instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error("Unknown benchmark '{name}' (available: {available})")]
    UnknownBenchmark { name: String, available: String },

    #[error("Invalid benchmark plan: {0}")]
    InvalidPlan(String),

    #[error("Failed to write {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Failed to encode results: {0}")]
    Serialize(#[from] serde_json::Error),
}
