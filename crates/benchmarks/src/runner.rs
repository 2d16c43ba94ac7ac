//! Benchmark runner: fills a context store with each generated document,
//! asks the model, and aggregates scores per context length.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smithers_core::message::ChatMessage;
use smithers_core::{ContextStore, Role};
use smithers_providers::ChatClient;
use std::fmt;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::benchmark::{store_tokens, Benchmark, BenchmarkRegistry, Evaluation};
use crate::error::BenchmarkError;

/// One question put to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// 1-based
    pub run: usize,
    pub question: String,
    pub expected_answer: String,
    /// Estimated tokens in the store when the question was asked
    pub context_tokens: usize,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub response: String,
    pub evaluation: Evaluation,
    pub latency_secs: f64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Averages over the runs at one context length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthSummary {
    /// Over successful runs only
    pub avg_score: f64,
    /// Over successful runs only
    pub avg_latency_secs: f64,
    pub success_rate: f64,
}

impl LengthSummary {
    pub fn from_runs(runs: &[RunResult]) -> Self {
        let succeeded: Vec<&RunResult> = runs.iter().filter(|r| r.success).collect();
        let mean = |values: Vec<f64>| {
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        };

        Self {
            avg_score: mean(succeeded.iter().map(|r| r.evaluation.score).collect()),
            avg_latency_secs: mean(succeeded.iter().map(|r| r.latency_secs).collect()),
            success_rate: if runs.is_empty() {
                0.0
            } else {
                succeeded.len() as f64 / runs.len() as f64
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LengthReport {
    pub context_length: usize,
    pub runs: Vec<RunResult>,
    pub summary: LengthSummary,
}

/// Every context length for one benchmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub benchmark: String,
    pub model: String,
    pub results: Vec<LengthReport>,
}

/// Every registered benchmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub model: String,
    pub benchmarks: Vec<BenchmarkReport>,
}

const RULE_WIDTH: usize = 60;

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.benchmark)?;
        writeln!(f, "{}", "-".repeat(40))?;
        for length in &self.results {
            writeln!(
                f,
                "  {} tokens: Score={:.2}, Latency={:.2}s, Success={:.2}%",
                length.context_length,
                length.summary.avg_score,
                length.summary.avg_latency_secs,
                length.summary.success_rate * 100.0
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(f, "{rule}")?;
        writeln!(f, "BENCHMARK SUMMARY ({})", self.model)?;
        writeln!(f, "{rule}")?;
        for report in &self.benchmarks {
            writeln!(f)?;
            write!(f, "{report}")?;
        }
        Ok(())
    }
}

/// Write any report as pretty JSON, creating parent directories.
pub fn save_report<T: Serialize>(report: &T, path: &Path) -> Result<(), BenchmarkError> {
    let io_error = |e: std::io::Error| BenchmarkError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(io_error)?;
    info!(path = %path.display(), "Benchmark results saved");
    Ok(())
}

/// Drives registered benchmarks against one chat client.
pub struct BenchmarkRunner {
    client: ChatClient,
    registry: BenchmarkRegistry,
    rng: StdRng,
}

impl BenchmarkRunner {
    /// Runner over the built-in benchmarks with a randomly seeded generator.
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            registry: crate::default_registry(),
            rng: StdRng::seed_from_u64(rand::random()),
        }
    }

    pub fn with_registry(mut self, registry: BenchmarkRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Make generated test cases reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn registry(&self) -> &BenchmarkRegistry {
        &self.registry
    }

    /// Run `name` `runs` times at each of `context_lengths`.
    ///
    /// A failed model call is recorded as an unsuccessful run with a zero
    /// score; it does not abort the benchmark.
    pub async fn run_benchmark(
        &mut self,
        name: &str,
        context_lengths: &[usize],
        runs: usize,
    ) -> Result<BenchmarkReport, BenchmarkError> {
        if context_lengths.is_empty() {
            return Err(BenchmarkError::InvalidPlan("no context lengths given".into()));
        }
        if runs == 0 {
            return Err(BenchmarkError::InvalidPlan("runs must be > 0".into()));
        }
        let benchmark = self
            .registry
            .get(name)
            .ok_or_else(|| BenchmarkError::UnknownBenchmark {
                name: name.to_string(),
                available: self.registry.names().join(", "),
            })?;

        let mut results = Vec::with_capacity(context_lengths.len());
        for &context_length in context_lengths {
            info!(benchmark = name, context_length, runs, "Running benchmark");

            let mut length_runs = Vec::with_capacity(runs);
            for run in 1..=runs {
                let result =
                    run_once(&self.client, benchmark, &mut self.rng, context_length, run).await;
                info!(
                    benchmark = name,
                    context_length,
                    run,
                    score = result.evaluation.score,
                    "Run finished"
                );
                length_runs.push(result);
            }

            results.push(LengthReport {
                context_length,
                summary: LengthSummary::from_runs(&length_runs),
                runs: length_runs,
            });
        }

        Ok(BenchmarkReport {
            benchmark: name.to_string(),
            model: self.client.model().to_string(),
            results,
        })
    }

    /// Run every registered benchmark in registration order.
    pub async fn run_all(
        &mut self,
        context_lengths: &[usize],
        runs: usize,
    ) -> Result<SuiteReport, BenchmarkError> {
        let names: Vec<String> = self.registry.names().into_iter().map(String::from).collect();
        let mut benchmarks = Vec::with_capacity(names.len());
        for name in &names {
            benchmarks.push(self.run_benchmark(name, context_lengths, runs).await?);
        }

        Ok(SuiteReport {
            model: self.client.model().to_string(),
            benchmarks,
        })
    }
}

async fn run_once(
    client: &ChatClient,
    benchmark: &dyn Benchmark,
    rng: &mut StdRng,
    context_length: usize,
    run: usize,
) -> RunResult {
    let case = benchmark.generate_test_case(context_length, rng);

    let mut store = ContextStore::new();
    store.create(Role::User, case.context.as_str(), None);
    let context_tokens = store_tokens(&store);

    let mut messages = store.messages();
    messages.push(ChatMessage::user(case.question.as_str()));

    let started = Instant::now();
    let outcome = client.complete(messages).await;
    let latency_secs = started.elapsed().as_secs_f64();

    let (response, evaluation, error) = match outcome {
        Ok(response) => {
            let evaluation = benchmark.evaluate(&response, &case.expected_answer);
            (response, evaluation, None)
        }
        Err(e) => {
            warn!(benchmark = benchmark.name(), run, error = %e, "Model call failed");
            (String::new(), Evaluation::failed(), Some(e.to_string()))
        }
    };

    RunResult {
        run,
        question: case.question,
        expected_answer: case.expected_answer,
        context_tokens,
        metadata: case.metadata,
        response,
        evaluation,
        latency_secs,
        success: error.is_none(),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::estimate_tokens;
    use crate::test_helpers::{client_for, FailingProvider, NeedleFinder, SequentialMockProvider};
    use smithers_core::error::ProviderError;

    #[tokio::test]
    async fn needle_is_found_when_the_model_reads_the_context() {
        let provider = NeedleFinder::new();
        let mut runner = BenchmarkRunner::new(client_for(provider.clone())).with_seed(1);

        let report = runner
            .run_benchmark("needle_in_haystack", &[500, 1000], 2)
            .await
            .unwrap();

        assert_eq!(report.benchmark, "needle_in_haystack");
        assert_eq!(report.model, "mock-model");
        assert_eq!(report.results.len(), 2);
        for length in &report.results {
            assert_eq!(length.runs.len(), 2);
            assert_eq!(length.summary.avg_score, 1.0);
            assert_eq!(length.summary.success_rate, 1.0);
            assert!(length.runs.iter().all(|r| r.evaluation.correct));
        }
        assert_eq!(provider.call_count(), 4);

        // The document goes in as a stored user entry, the question after it
        let request = provider.last_request();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::User);
        assert!(request.messages[0].content.contains("The special code is: "));
        assert_eq!(
            request.messages[1].content,
            "What is the special code mentioned in the text?"
        );
        let last = &report.results[1].runs[1];
        assert_eq!(last.context_tokens, estimate_tokens(&request.messages[0].content));
    }

    #[tokio::test]
    async fn wrong_answers_score_zero_but_succeed() {
        let provider = SequentialMockProvider::new(&["???", "???", "???"]);
        let mut runner = BenchmarkRunner::new(client_for(provider.clone())).with_seed(2);

        let report = runner
            .run_benchmark("needle_in_haystack", &[1000], 3)
            .await
            .unwrap();

        let summary = report.results[0].summary;
        assert_eq!(summary.avg_score, 0.0);
        assert_eq!(summary.success_rate, 1.0);
        assert_eq!(report.results[0].runs[2].run, 3);
        assert_eq!(report.results[0].runs[0].response, "???");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn failed_calls_are_recorded_not_raised() {
        let provider = FailingProvider::new(ProviderError::Network("refused".into()));
        let mut runner = BenchmarkRunner::new(client_for(provider)).with_seed(3);

        let report = runner.run_benchmark("oolong", &[200], 2).await.unwrap();
        let length = &report.results[0];
        assert_eq!(length.summary.success_rate, 0.0);
        assert_eq!(length.summary.avg_score, 0.0);
        assert_eq!(length.summary.avg_latency_secs, 0.0);
        for run in &length.runs {
            assert!(!run.success);
            assert!(run.error.as_deref().unwrap().contains("refused"));
            assert_eq!(run.response, "");
        }
    }

    #[tokio::test]
    async fn bad_plans_are_rejected_before_any_call() {
        let provider = SequentialMockProvider::new(&[]);
        let mut runner = BenchmarkRunner::new(client_for(provider.clone()));

        let err = runner.run_benchmark("haystack", &[100], 1).await.unwrap_err();
        assert!(matches!(err, BenchmarkError::UnknownBenchmark { .. }));
        assert!(err.to_string().contains("needle_in_haystack"));

        let err = runner.run_benchmark("oolong", &[], 1).await.unwrap_err();
        assert!(matches!(err, BenchmarkError::InvalidPlan(_)));
        let err = runner.run_benchmark("oolong", &[100], 0).await.unwrap_err();
        assert!(matches!(err, BenchmarkError::InvalidPlan(_)));

        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn run_all_covers_every_benchmark_in_order() {
        let provider = SequentialMockProvider::new(&["a"; 5]);
        let mut runner = BenchmarkRunner::new(client_for(provider.clone())).with_seed(4);

        let suite = runner.run_all(&[100], 1).await.unwrap();
        let names: Vec<&str> = suite.benchmarks.iter().map(|b| b.benchmark.as_str()).collect();
        assert_eq!(
            names,
            vec!["needle_in_haystack", "oolong", "oolong_pairs", "codeqa", "browsecomp"]
        );
        assert_eq!(provider.call_count(), 5);

        let summary = suite.to_string();
        assert!(summary.contains("BENCHMARK SUMMARY (mock-model)"));
        assert!(summary.contains("codeqa:"));
        assert!(summary.contains("100 tokens: Score="));
        assert!(summary.contains("Success=100.00%"));
    }

    #[test]
    fn summary_averages_successful_runs_only() {
        let run = |score: f64, latency_secs: f64, success: bool| RunResult {
            run: 1,
            question: "q".into(),
            expected_answer: "a".into(),
            context_tokens: 0,
            metadata: Map::new(),
            response: String::new(),
            evaluation: Evaluation::new(score == 1.0, score),
            latency_secs,
            success,
            error: None,
        };

        let summary = LengthSummary::from_runs(&[
            run(1.0, 2.0, true),
            run(0.5, 4.0, true),
            run(0.0, 9.0, false),
            run(0.0, 9.0, false),
        ]);
        assert_eq!(summary.avg_score, 0.75);
        assert_eq!(summary.avg_latency_secs, 3.0);
        assert_eq!(summary.success_rate, 0.5);

        assert_eq!(LengthSummary::from_runs(&[]).success_rate, 0.0);
    }

    #[tokio::test]
    async fn reports_save_as_json() {
        let provider = SequentialMockProvider::new(&["x"]);
        let mut runner = BenchmarkRunner::new(client_for(provider)).with_seed(5);
        let report = runner.run_benchmark("codeqa", &[50], 1).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("codeqa.json");
        save_report(&report, &path).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["benchmark"], "codeqa");
        assert_eq!(saved["results"][0]["context_length"], 50);
        assert_eq!(saved["results"][0]["runs"][0]["response"], "x");
        assert!(saved["results"][0]["runs"][0].get("error").is_none());
    }
}
