pub mod bench;
pub mod chat;
pub mod doctor;
pub mod onboard;
pub mod repl;
pub mod visualize;

pub use smithers_assistant::load_config;
use smithers_config::AppConfig;

/// Fail early with setup instructions when no API key is available.
pub fn require_api_key(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.has_api_key() {
        return Ok(());
    }

    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables (or put it in a .env file):");
    eprintln!("    SMITHERS_API_KEY=sk-...   (preferred)");
    eprintln!("    OPENAI_API_KEY=sk-...");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_path().display());
    eprintln!();
    eprintln!("  Local servers (provider = \"ollama\", \"vllm\", ...) accept any placeholder key.");
    eprintln!();
    Err("No API key found. See above for setup instructions.".into())
}
