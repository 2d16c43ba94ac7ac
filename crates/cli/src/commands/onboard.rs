//! `smithers onboard`: first-time setup.

use smithers_config::AppConfig;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path);

    println!("Smithers: First-Time Setup");
    println!("==========================\n");

    if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if dir.exists() {
            println!("  Config directory exists: {}", dir.display());
        } else {
            std::fs::create_dir_all(dir)?;
            println!("  Created config directory: {}", dir.display());
        }
    }

    if config_path.exists() {
        println!("\n  Config already exists at: {}", config_path.display());
        println!("  Edit it manually or delete it and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("  Created config.toml at: {}", config_path.display());
        println!("\n  Next steps:");
        println!("   1. Add your API key to {} (or set SMITHERS_API_KEY)", config_path.display());
        println!("   2. Run: smithers");
        println!("   3. Type `help` for the command list\n");
    }

    println!("Setup complete.");
    Ok(())
}
