//! Building generation clients from user-supplied credentials

use super::{CredentialError, GeminiModel, GeminiService, LlmService, LoggingService};
use std::sync::Arc;
use std::time::Duration;

/// Provider settings shared by every client the factory builds
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model: GeminiModel,
    /// Gateway base URL (e.g., `http://169.254.169.254/gateway/llm`)
    pub gateway: Option<String>,
    pub timeout: Duration,
    pub max_output_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: GeminiModel::GeminiPro,
            gateway: None,
            timeout: Duration::from_secs(120),
            max_output_tokens: None,
        }
    }
}

/// Configures a generation client for one API key
pub trait ClientFactory: Send + Sync {
    /// Build a client bound to `api_key`, or reject the key
    fn configure(&self, api_key: &str) -> Result<Arc<dyn LlmService>, CredentialError>;

    /// Output token cap applied to every request
    fn max_output_tokens(&self) -> Option<u32> {
        None
    }
}

/// Factory for Gemini clients, each wrapped with request logging
pub struct GeminiFactory {
    config: LlmConfig,
}

impl GeminiFactory {
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }
}

impl ClientFactory for GeminiFactory {
    fn configure(&self, api_key: &str) -> Result<Arc<dyn LlmService>, CredentialError> {
        let service = GeminiService::new(
            api_key,
            self.config.model,
            self.config.gateway.as_deref(),
            self.config.timeout,
        )?;
        Ok(Arc::new(LoggingService::new(Arc::new(service))))
    }

    fn max_output_tokens(&self) -> Option<u32> {
        self.config.max_output_tokens
    }
}

impl<T: ClientFactory + ?Sized> ClientFactory for Arc<T> {
    fn configure(&self, api_key: &str) -> Result<Arc<dyn LlmService>, CredentialError> {
        (**self).configure(api_key)
    }

    fn max_output_tokens(&self) -> Option<u32> {
        (**self).max_output_tokens()
    }
}
