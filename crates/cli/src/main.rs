//! Smithers CLI, the main entry point.
//!
//! Commands:
//! - `repl`       Interactive Smithers session (the default)
//! - `chat`       Direct chat with the model, no context kept
//! - `visualize`  Render a saved context snapshot as a graph
//! - `bench`      Run long-context benchmarks against the model
//! - `doctor`     Diagnose configuration and optional tools
//! - `onboard`    Write a default config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "smithers",
    about = "Smithers: a context-window managing chat assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.smithers/config.toml
    #[arg(long, global = true, value_name = "PATH", env = "SMITHERS_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session with context management commands
    Repl,

    /// Chat directly with the model without keeping context
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Render a saved context snapshot as a conversation graph
    Visualize {
        /// Snapshot file written by `save`
        snapshot: PathBuf,

        /// Output file (.dot, .gv, .png, .svg, .pdf, .jpg); opens a viewer when omitted
        output: Option<PathBuf>,

        /// Only draw entries in start:end
        #[arg(short, long)]
        range: Option<String>,
    },

    /// Run long-context benchmarks against the configured model
    Bench {
        /// Benchmark to run (needle_in_haystack, oolong, oolong_pairs, codeqa, browsecomp) or "all"
        #[arg(short, long, default_value = "all")]
        benchmark: String,

        /// Context lengths to test, in estimated tokens
        #[arg(long, value_delimiter = ',', default_values_t = [1000, 5000, 10000, 20000])]
        context_lengths: Vec<usize>,

        /// Runs per context length
        #[arg(long, default_value_t = 3)]
        runs: usize,

        /// Model to benchmark instead of the configured default
        #[arg(short, long)]
        model: Option<String>,

        /// Write the full results as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for reproducible test cases
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Diagnose configuration and optional tools
    Doctor,

    /// Create the default configuration file
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is normal
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logs go to stderr so REPL output stays clean
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => commands::repl::run(config_path).await?,
        Commands::Chat { message } => commands::chat::run(config_path, message).await?,
        Commands::Visualize {
            snapshot,
            output,
            range,
        } => commands::visualize::run(config_path, &snapshot, output.as_deref(), range.as_deref()).await?,
        Commands::Bench {
            benchmark,
            context_lengths,
            runs,
            model,
            output,
            seed,
        } => {
            let options = commands::bench::BenchOptions {
                benchmark,
                context_lengths,
                runs,
                model,
                output,
                seed,
            };
            commands::bench::run(config_path, options).await?
        }
        Commands::Doctor => commands::doctor::run(config_path).await?,
        Commands::Onboard => commands::onboard::run(config_path).await?,
    }

    Ok(())
}
