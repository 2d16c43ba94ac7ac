//! `smithers repl`: interactive session with context management commands.

use smithers_assistant::{Reply, Session, HELP};
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{load_config, require_api_key};

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    require_api_key(&config)?;

    let mut session = Session::from_config(&config)?;
    tracing::debug!(provider = %config.default_provider, model = %config.default_model, "Session started");

    println!("Smithers Assistant - Context Window Manager");
    println!("  Provider: {}", config.default_provider);
    println!("  Model:    {}", config.default_model);
    println!();
    println!("{HELP}");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match session.execute_line(&line).await {
            Ok(Reply::Text(text)) => println!("{text}\n"),
            Ok(Reply::Silent) => {}
            Ok(Reply::Exit) => break,
            Err(e) => println!("Error: {e}\n"),
        }
    }

    println!("Goodbye!");
    Ok(())
}
