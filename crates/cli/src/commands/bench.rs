//! `smithers bench`: run the long-context benchmarks against the configured
//! model.

use smithers_benchmarks::{save_report, BenchmarkRunner};
use smithers_providers::build_chat_client;
use std::path::{Path, PathBuf};

use super::{load_config, require_api_key};

/// Options for one benchmark session.
pub struct BenchOptions {
    /// A benchmark name, or "all"
    pub benchmark: String,
    pub context_lengths: Vec<usize>,
    pub runs: usize,
    pub model: Option<String>,
    pub output: Option<PathBuf>,
    pub seed: Option<u64>,
}

pub async fn run(
    config_path: Option<&Path>,
    options: BenchOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path)?;
    if let Some(model) = options.model {
        config.default_model = model;
    }
    require_api_key(&config)?;

    let mut runner = BenchmarkRunner::new(build_chat_client(&config)?);
    if let Some(seed) = options.seed {
        runner = runner.with_seed(seed);
    }

    println!(
        "Benchmarking {} at {:?} tokens, {} run(s) each",
        config.default_model, options.context_lengths, options.runs
    );

    if options.benchmark == "all" {
        let report = runner.run_all(&options.context_lengths, options.runs).await?;
        println!("\n{report}");
        if let Some(path) = &options.output {
            save_report(&report, path)?;
            println!("Results saved to {}", path.display());
        }
    } else {
        let report = runner
            .run_benchmark(&options.benchmark, &options.context_lengths, options.runs)
            .await?;
        println!("\n{report}");
        if let Some(path) = &options.output {
            save_report(&report, path)?;
            println!("Results saved to {}", path.display());
        }
    }

    Ok(())
}
