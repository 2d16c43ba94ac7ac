//! Long-context benchmarks for Smithers.
//!
//! Each benchmark generates a document of roughly the requested token
//! count with one answerable fact in it. The [`BenchmarkRunner`] loads the
//! document into a fresh [`smithers_core::ContextStore`], sends the stored
//! history plus the question through a [`smithers_providers::ChatClient`],
//! scores the reply and averages the scores per context length.
//!
//! Built-in benchmarks:
//! - `needle_in_haystack`: an 8-character code hidden in filler
//! - `oolong`: one fact at a chosen position
//! - `oolong_pairs`: two facts about one person, split apart
//! - `codeqa`: a question about a code snippet inside prose
//! - `browsecomp`: comprehension across document sections

pub mod benchmark;
pub mod browsecomp;
pub mod codeqa;
pub mod error;
pub mod needle;
pub mod oolong;
pub mod runner;

#[cfg(test)]
mod test_helpers;

pub use benchmark::{estimate_tokens, Benchmark, BenchmarkRegistry, Evaluation, Placement, TestCase};
pub use error::BenchmarkError;
pub use runner::{save_report, BenchmarkReport, BenchmarkRunner, LengthSummary, RunResult, SuiteReport};

/// Create a registry with every built-in benchmark, in run order.
pub fn default_registry() -> BenchmarkRegistry {
    let mut registry = BenchmarkRegistry::new();
    registry.register(Box::new(needle::NeedleInHaystack::new()));
    registry.register(Box::new(oolong::Oolong::new()));
    registry.register(Box::new(oolong::OolongPairs::new()));
    registry.register(Box::new(codeqa::CodeQa));
    registry.register(Box::new(browsecomp::BrowseComp));
    registry
}
