//! Provider construction from configuration.

use smithers_config::AppConfig;
use smithers_core::error::ProviderError;
use smithers_core::provider::Provider;
use std::sync::Arc;
use std::time::Duration;

use crate::chat_client::ChatClient;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the configured provider.
///
/// The base URL comes from `api_url` when set, otherwise from the provider
/// name. A missing API key is allowed here (local endpoints need none); the
/// CLI checks for it before starting a session.
pub fn build_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let base_url = config
        .api_url
        .clone()
        .map(Ok)
        .unwrap_or_else(|| default_base_url(&config.default_provider))?;

    let provider = OpenAiCompatProvider::with_timeout(
        &config.default_provider,
        base_url,
        config.api_key.clone().unwrap_or_default(),
        Duration::from_secs(config.request_timeout_secs),
    )?;

    Ok(Arc::new(provider))
}

/// Build a [`ChatClient`] with the configured model settings.
pub fn build_chat_client(config: &AppConfig) -> Result<ChatClient, ProviderError> {
    let provider = build_provider(config)?;
    Ok(ChatClient::new(provider, &config.default_model)
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.default_max_tokens))
}

/// Get the default base URL for well-known OpenAI-compatible providers.
pub fn default_base_url(provider_name: &str) -> Result<String, ProviderError> {
    let url = match provider_name {
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        other => {
            return Err(ProviderError::NotConfigured(format!(
                "Unknown provider '{other}'; set api_url in the config"
            )));
        }
    };
    Ok(url.to_string())
}
