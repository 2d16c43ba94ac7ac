//! Shared test helpers for assistant and session tests.

use smithers_core::error::ProviderError;
use smithers_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use smithers_providers::ChatClient;
use std::sync::{Arc, Mutex};

/// A mock provider that returns a sequence of scripted replies.
///
/// Each call to `complete` returns the next reply in the queue and records
/// the request. Panics if more calls are made than replies provided.
pub struct SequentialMockProvider {
    replies: Vec<String>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request seen so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
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
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let call = requests.len();
        if call >= self.replies.len() {
            panic!(
                "SequentialMockProvider: no more replies (call #{}, have {})",
                call,
                self.replies.len()
            );
        }
        requests.push(request);

        Ok(make_text_response(&self.replies[call]))
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

pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        content: text.into(),
        model: "mock-model".into(),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
    }
}

pub fn client_for(provider: Arc<dyn Provider>) -> ChatClient {
    ChatClient::new(provider, "mock-model")
}
