//! Benchmark trait: the abstraction over long-context test generators.
//!
//! A benchmark builds a document of roughly the requested size with one
//! answerable fact hidden in it, and scores a model's reply against the
//! expected answer. Benchmarks are registered in a [`BenchmarkRegistry`] and
//! driven by the [`crate::runner::BenchmarkRunner`].

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smithers_core::ContextStore;
use std::collections::HashSet;
use std::fmt;

/// Rough token count: four characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

/// Estimated tokens across every entry in `store`.
pub fn store_tokens(store: &ContextStore) -> usize {
    store
        .entries()
        .iter()
        .map(|entry| estimate_tokens(&entry.content))
        .sum()
}

/// One generated question and the document it is asked about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Document placed in the store as a single user entry
    pub context: String,

    /// Asked after the document
    pub question: String,

    pub expected_answer: String,

    /// Generation details (placement, sentence counts, ...)
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// How well a reply matched the expected answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub correct: bool,

    /// 0.0 ..= 1.0
    pub score: f64,

    /// Benchmark-specific match details
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl Evaluation {
    pub fn new(correct: bool, score: f64) -> Self {
        Self {
            correct,
            score,
            details: Map::new(),
        }
    }

    /// Zero score for a run whose request failed.
    pub fn failed() -> Self {
        Self::new(false, 0.0)
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// The core Benchmark trait.
pub trait Benchmark: Send + Sync {
    /// Registry key (e.g. "needle_in_haystack").
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Build a test case whose document is roughly `context_length` tokens.
    fn generate_test_case(&self, context_length: usize, rng: &mut StdRng) -> TestCase;

    /// Score `response` against `expected`.
    fn evaluate(&self, response: &str, expected: &str) -> Evaluation;
}

/// Where a planted fact goes in the filler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Start,
    Middle,
    End,
    #[default]
    Random,
}

impl Placement {
    /// Pick a slot in `0..slots`. `slots` must be non-zero.
    pub fn resolve(self, slots: usize, rng: &mut StdRng) -> usize {
        match self {
            Placement::Start => 0,
            Placement::Middle => slots / 2,
            Placement::End => slots - 1,
            Placement::Random => rng.random_range(0..slots),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Placement::Start => "start",
            Placement::Middle => "middle",
            Placement::End => "end",
            Placement::Random => "random",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registry of available benchmarks, kept in registration order.
pub struct BenchmarkRegistry {
    benchmarks: Vec<Box<dyn Benchmark>>,
}

impl BenchmarkRegistry {
    pub fn new() -> Self {
        Self {
            benchmarks: Vec::new(),
        }
    }

    /// Register a benchmark. Replaces any existing one with the same name.
    pub fn register(&mut self, benchmark: Box<dyn Benchmark>) {
        let existing = self
            .benchmarks
            .iter()
            .position(|b| b.name() == benchmark.name());
        match existing {
            Some(index) => self.benchmarks[index] = benchmark,
            None => self.benchmarks.push(benchmark),
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Benchmark> {
        self.benchmarks
            .iter()
            .find(|b| b.name() == name)
            .map(|b| b.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.benchmarks.iter().map(|b| b.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }
}

impl Default for BenchmarkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// --- Helpers shared by the built-in benchmarks ---

pub(crate) fn pick<'a, T>(items: &'a [T], rng: &mut StdRng) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

/// `count` sentences drawn from `pool` with replacement.
pub(crate) fn filler(pool: &[&str], count: usize, rng: &mut StdRng) -> Vec<String> {
    (0..count).map(|_| pick(pool, rng).to_string()).collect()
}

fn words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Share of the distinct words of `expected` that also appear in `response`.
pub(crate) fn word_overlap(response: &str, expected: &str) -> f64 {
    let expected = words(expected);
    if expected.is_empty() {
        return 0.0;
    }
    let response = words(response);
    expected.intersection(&response).count() as f64 / expected.len() as f64
}

/// Exact match scores 1.0, containment 0.8, otherwise word overlap capped
/// at 0.6. With `either_way`, a non-empty reply contained in the expected
/// answer also counts as containment.
pub(crate) fn graded_match(response: &str, expected: &str, either_way: bool) -> Evaluation {
    let response_lower = response.trim().to_lowercase();
    let expected_lower = expected.trim().to_lowercase();

    let exact = response_lower == expected_lower;
    let contains = response_lower.contains(&expected_lower)
        || (either_way && !response_lower.is_empty() && expected_lower.contains(&response_lower));
    let partial = word_overlap(&response_lower, &expected_lower);

    let score = if exact {
        1.0
    } else if contains {
        0.8
    } else {
        partial.min(0.6)
    };

    Evaluation::new(exact, score)
        .with_detail("contains_match", contains)
        .with_detail("partial_score", partial)
}
