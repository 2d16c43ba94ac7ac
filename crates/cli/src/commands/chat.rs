//! `smithers chat`: talk to the model directly, one message at a time.

use smithers_providers::build_chat_client;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{load_config, require_api_key};

pub async fn run(
    config_path: Option<&Path>,
    message: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    require_api_key(&config)?;

    let client = build_chat_client(&config)?;

    if let Some(msg) = message {
        let reply = client.ask(msg).await?;
        println!("{reply}");
        return Ok(());
    }

    println!("Chat with {} ({}). Type 'exit' to quit.", client.model(), client.provider_name());
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line.to_ascii_lowercase().as_str(), "exit" | "quit" | "q") {
            break;
        }

        match client.ask(line).await {
            Ok(reply) => println!("Assistant: {reply}\n"),
            Err(e) => println!("Error: {e}\n"),
        }
    }

    Ok(())
}
