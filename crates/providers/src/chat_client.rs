//! Stateless chat client: messages in, reply text out.

use smithers_core::error::ProviderError;
use smithers_core::message::ChatMessage;
use smithers_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use tracing::debug;

/// Wraps a [`Provider`] with the model settings every request shares.
///
/// Holds no conversation state: each `complete` call is independent.
#[derive(Clone)]
pub struct ChatClient {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ChatClient {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send `messages` and return the assistant's reply text.
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, ProviderError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.provider.complete(request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion received"
            );
        }
        Ok(response.content)
    }

    /// Send one user message with no history.
    pub async fn ask(&self, message: impl Into<String>) -> Result<String, ProviderError> {
        self.complete(vec![ChatMessage::user(message)]).await
    }
}
