//! Mock implementations for testing
//!
//! These mocks let the controller and HTTP layer run without a network.

use super::Controller;
use crate::llm::{
    ClientFactory, CredentialError, GenerationError, LlmRequest, LlmResponse, LlmService,
};
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock generation client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, GenerationError>>>,
    /// Record of all requests made
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful text response
    pub fn queue_response(&self, text: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(LlmResponse::text(text)));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: GenerationError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Drop any responses that were queued but not consumed
    pub fn clear_queued(&self) {
        self.responses.lock().unwrap().clear();
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Prompt text of every request, in call order
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmService for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

// ============================================================================
// Mock Client Factory
// ============================================================================

/// Factory handing out one shared mock client; selected keys are rejected
pub struct MockClientFactory {
    client: Arc<MockLlmClient>,
    rejected: Mutex<HashSet<String>>,
    configured: Mutex<Vec<String>>,
    max_output_tokens: Option<u32>,
}

impl MockClientFactory {
    pub fn new() -> Self {
        Self {
            client: Arc::new(MockLlmClient::new()),
            rejected: Mutex::new(HashSet::new()),
            configured: Mutex::new(Vec::new()),
            max_output_tokens: None,
        }
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: Option<u32>) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn client(&self) -> Arc<MockLlmClient> {
        self.client.clone()
    }

    /// Make `configure` fail for this key
    pub fn reject_key(&self, key: impl Into<String>) {
        self.rejected.lock().unwrap().insert(key.into());
    }

    /// Keys that were successfully configured
    pub fn configured_keys(&self) -> Vec<String> {
        self.configured.lock().unwrap().clone()
    }
}

impl Default for MockClientFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientFactory for MockClientFactory {
    fn configure(&self, api_key: &str) -> Result<Arc<dyn LlmService>, CredentialError> {
        if self.rejected.lock().unwrap().contains(api_key) {
            return Err(CredentialError::Client("key rejected by mock".to_string()));
        }
        self.configured.lock().unwrap().push(api_key.to_string());
        Ok(self.client.clone())
    }

    fn max_output_tokens(&self) -> Option<u32> {
        self.max_output_tokens
    }
}

/// Controller wired to a fresh mock factory
pub fn setup() -> (Controller<Arc<MockClientFactory>>, Arc<MockClientFactory>) {
    let factory = Arc::new(MockClientFactory::new());
    (Controller::new(factory.clone()), factory)
}
