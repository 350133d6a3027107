//! API request and response types

use crate::runtime::Snapshot;
use serde::{Deserialize, Serialize};

/// API key entered in the credential field
#[derive(Deserialize)]
pub struct CredentialRequest {
    pub api_key: String,
}

/// Question typed into the chat input
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Selection from the asked-questions list (zero-based)
#[derive(Debug, Deserialize)]
pub struct ReplayRequest {
    pub index: usize,
}

/// Response for session creation
#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: String,
    pub snapshot: Snapshot,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub model: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
