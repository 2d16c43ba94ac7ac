//! Shared test helpers for benchmark and runner tests.

use smithers_core::error::ProviderError;
use smithers_core::provider::{Provider, ProviderRequest, ProviderResponse};
use smithers_providers::ChatClient;
use std::sync::{Arc, Mutex};

fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        content: text.into(),
        model: "mock-model".into(),
        usage: None,
    }
}

/// A mock provider that returns a sequence of scripted replies.
///
/// Panics if more calls are made than replies provided.
pub struct SequentialMockProvider {
    replies: Vec<String>,
    calls: Mutex<usize>,
}

impl SequentialMockProvider {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            calls: Mutex::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        let reply = self.replies.get(*calls).unwrap_or_else(|| {
            panic!(
                "SequentialMockProvider: no more replies (call #{}, have {})",
                *calls,
                self.replies.len()
            )
        });
        *calls += 1;
        Ok(text_response(reply))
    }
}

/// Answers with whatever follows "The special code is: " in the request,
/// the way a model that actually reads its context would.
pub struct NeedleFinder {
    requests: Mutex<Vec<ProviderRequest>>,
}

impl NeedleFinder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> ProviderRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request recorded")
    }
}

#[async_trait::async_trait]
impl Provider for NeedleFinder {
    fn name(&self) -> &str {
        "needle_finder"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let code = request
            .messages
            .iter()
            .find_map(|m| m.content.split_once("The special code is: "))
            .map(|(_, rest)| rest.chars().take(8).collect::<String>())
            .unwrap_or_default();
        self.requests.lock().unwrap().push(request);
        Ok(text_response(&format!("The code is {code}.")))
    }
}

/// A provider whose every call fails with the given error.
pub struct FailingProvider {
    error: ProviderError,
}

impl FailingProvider {
    pub fn new(error: ProviderError) -> Arc<Self> {
        Arc::new(Self { error })
    }
}

#[async_trait::async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(self.error.clone())
    }
}

pub fn client_for(provider: Arc<dyn Provider>) -> ChatClient {
    ChatClient::new(provider, "mock-model")
}
