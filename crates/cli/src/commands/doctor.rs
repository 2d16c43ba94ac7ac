//! `smithers doctor`: diagnose configuration and optional tools.

use smithers_config::AppConfig;
use smithers_providers::{build_provider, default_base_url};
use smithers_visualizer::GraphvizRenderer;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Smithers Doctor: System Diagnostics");
    println!("===================================\n");

    let mut issues = 0;

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path);
    if path.exists() {
        println!("  [ok]   Config file found: {}", path.display());
    } else {
        println!("  [info] No config file at {}, using defaults (run `smithers onboard`)", path.display());
    }

    let config = match AppConfig::load_with_env(&path) {
        Ok(config) => {
            println!("  [ok]   Config valid");
            config
        }
        Err(e) => {
            println!("  [fail] Config invalid: {e}");
            println!("\n  1 issue found. Fix the config and re-run.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  [ok]   API key configured");
    } else {
        println!("  [warn] No API key: set SMITHERS_API_KEY or OPENAI_API_KEY, or add api_key to config.toml");
        issues += 1;
    }

    let endpoint_known = match (&config.api_url, default_base_url(&config.default_provider)) {
        (Some(url), _) => {
            println!("  [ok]   Endpoint: {url}");
            true
        }
        (None, Ok(url)) => {
            println!("  [ok]   Endpoint: {url} ({})", config.default_provider);
            true
        }
        (None, Err(e)) => {
            println!("  [fail] {e}");
            issues += 1;
            false
        }
    };
    println!("  [ok]   Model: {}", config.default_model);

    if endpoint_known && config.has_api_key() {
        match build_provider(&config) {
            Ok(provider) => match provider.health_check().await {
                Ok(true) => println!("  [ok]   Endpoint reachable, key accepted"),
                Ok(false) => {
                    println!("  [fail] Endpoint rejected the model listing (check the API key)");
                    issues += 1;
                }
                Err(e) => {
                    println!("  [fail] Endpoint unreachable: {e}");
                    issues += 1;
                }
            },
            Err(e) => {
                println!("  [fail] {e}");
                issues += 1;
            }
        }
    }

    let renderer = GraphvizRenderer::new(&config.visualizer.graphviz_binary);
    if renderer.is_available().await {
        println!("  [ok]   Graphviz available ({})", renderer.binary());
    } else {
        println!(
            "  [warn] Graphviz '{}' not found: image output disabled, .dot output still works",
            renderer.binary()
        );
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
